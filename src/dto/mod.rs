//! DTOs de la API
//!
//! Requests validados con `validator` y respuestas serializadas con `serde`.

pub mod auth_dto;
pub mod common_dto;
pub mod kyc_dto;
pub mod loyalty_dto;
pub mod payment_dto;
pub mod rental_dto;
pub mod station_dto;
pub mod vehicle_dto;
