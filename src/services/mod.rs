//! Servicios de dominio
//!
//! Lógica pura del negocio de alquiler: ciclo de vida de reservas,
//! precios y fidelización. Los controllers orquestan estos servicios
//! con los repositorios.

pub mod loyalty_service;
pub mod pricing_service;
pub mod rental_lifecycle;
