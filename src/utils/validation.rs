//! Utilidades de validación
//!
//! Validadores usados desde `#[validate(custom = ...)]` en los DTOs
//! y desde los controllers para parámetros de consulta.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationError;

use crate::utils::errors::AppError;

lazy_static! {
    /// VIN de 17 caracteres sin I, O ni Q
    static ref VIN_REGEX: Regex = Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").expect("valid VIN regex");
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9 \-]{8,18}[0-9]$").expect("valid phone regex");
    /// Documento de identidad de 12 dígitos
    static ref KYC_DOCUMENT_REGEX: Regex = Regex::new(r"^[0-9]{12}$").expect("valid document regex");
}

/// Validar formato de teléfono
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if !PHONE_REGEX.is_match(value) || !(10..=15).contains(&digits) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar número de bastidor (VIN)
pub fn validate_vin(value: &str) -> Result<(), ValidationError> {
    if !VIN_REGEX.is_match(value) {
        let mut error = ValidationError::new("vin");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"17 characters, excluding I, O and Q".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar número de documento para KYC
pub fn validate_kyc_document(value: &str) -> Result<(), ValidationError> {
    if !KYC_DOCUMENT_REGEX.is_match(value) {
        let mut error = ValidationError::new("document_number");
        error.add_param("format".into(), &"12 digits".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar latitud (-90 a 90)
pub fn validate_latitude(value: f64) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&value) {
        let mut error = ValidationError::new("latitude");
        error.add_param("value".into(), &value);
        error.add_param("range".into(), &"-90.0 to 90.0".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar longitud (-180 a 180)
pub fn validate_longitude(value: f64) -> Result<(), ValidationError> {
    if !(-180.0..=180.0).contains(&value) {
        let mut error = ValidationError::new("longitude");
        error.add_param("value".into(), &value);
        error.add_param("range".into(), &"-180.0 to 180.0".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de coordenadas GPS
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), ValidationError> {
    validate_latitude(lat)?;
    validate_longitude(lng)
}

/// Validar que un valor sea positivo
pub fn validate_positive<T>(value: &T) -> Result<(), ValidationError>
where
    T: PartialOrd + num_traits::Zero + Serialize,
{
    if *value <= T::zero() {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T>(value: &T) -> Result<(), ValidationError>
where
    T: PartialOrd + num_traits::Zero + Serialize,
{
    if *value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), value);
        return Err(error);
    }
    Ok(())
}

pub fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    validate_positive(value)
}

pub fn validate_non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(value)
}

/// Convertir un error de validación de parámetros en 400
pub fn into_bad_request(field: &str, error: ValidationError) -> AppError {
    AppError::BadRequest(format!("Invalid {}: {}", field, error.code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("+91 98765 43210").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("phone-number").is_err());
        assert!(validate_phone("1234567890123456").is_err());
    }

    #[test]
    fn test_validate_vin() {
        assert!(validate_vin("1HGCM82633A004352").is_ok());
        assert!(validate_vin("1HGCM82633A00435").is_err());
        // I, O y Q no están permitidas
        assert!(validate_vin("1HGCM82633A00435I").is_err());
        assert!(validate_vin("1HGCM82633AO04352").is_err());
        assert!(validate_vin("1hgcm82633a004352").is_err());
    }

    #[test]
    fn test_validate_kyc_document() {
        assert!(validate_kyc_document("123456789012").is_ok());
        assert!(validate_kyc_document("12345678901").is_err());
        assert!(validate_kyc_document("12345678901a").is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(28.61, 77.20).is_ok());
        assert!(validate_coordinates(91.0, -75.0).is_err());
        assert!(validate_coordinates(45.0, -181.0).is_err());
    }

    #[test]
    fn test_validate_positive_and_non_negative() {
        assert!(validate_positive(&5).is_ok());
        assert!(validate_positive(&0).is_err());
        assert!(validate_positive_amount(&Decimal::new(150, 2)).is_ok());
        assert!(validate_positive_amount(&Decimal::ZERO).is_err());
        assert!(validate_non_negative_amount(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative(&-1).is_err());
    }

    #[test]
    fn test_into_bad_request() {
        let err = validate_coordinates(100.0, 0.0).unwrap_err();
        match into_bad_request("coordinates", err) {
            AppError::BadRequest(msg) => assert_eq!(msg, "Invalid coordinates: latitude"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
