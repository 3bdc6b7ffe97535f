//! API de alquiler de vehículos eléctricos
//!
//! Estaciones, inventario, reservas con su ciclo de vida, pagos
//! internos, fidelización y verificación KYC sobre PostgreSQL.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app;
pub use state::AppState;
