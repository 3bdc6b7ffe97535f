//! Repositorios
//!
//! Un repositorio por agregado. Las operaciones que forman parte de una
//! transacción reciben `&mut PgConnection` en lugar de usar el pool.

pub mod admin_repository;
pub mod loyalty_repository;
pub mod payment_repository;
pub mod rental_repository;
pub mod station_repository;
pub mod user_repository;
pub mod vehicle_repository;
