//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! JWT, paginación, referencias y hash de contraseñas.

pub mod errors;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod reference;
pub mod validation;
