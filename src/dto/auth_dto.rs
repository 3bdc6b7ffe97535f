use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Admin, AdminRole, User};
use crate::utils::jwt::TokenPair;

/// Registro de cliente
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    pub confirm_password: String,

    #[validate(custom = "crate::utils::validation::validate_phone")]
    pub phone: Option<String>,

    #[validate(length(max = 100))]
    pub district: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Alta de personal (solo SUPER_ADMIN)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAdminRequest {
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50))]
    pub last_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(custom = "crate::utils::validation::validate_phone")]
    pub phone_number: Option<String>,

    pub role: AdminRole,

    pub station_id: Option<Uuid>,
}

/// Tokens junto al perfil del principal
#[derive(Debug, Serialize)]
pub struct AuthResponse<P: Serialize> {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub role: String,
    pub profile: P,
}

/// Perfil del principal autenticado
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Profile {
    User(User),
    Admin(Admin),
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub role: String,
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            password: "longenough".to_string(),
            confirm_password: "longenough".to_string(),
            phone: Some("9876543210".to_string()),
            district: None,
        };
        assert!(valid.validate().is_ok());

        let invalid = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            phone: Some("12".to_string()),
            ..valid
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("phone"));
    }

    #[test]
    fn test_create_admin_role_parses_from_json() {
        let request: CreateAdminRequest = serde_json::from_value(serde_json::json!({
            "first_name": "Ravi",
            "last_name": "Iyer",
            "email": "ravi@example.com",
            "password": "supersecret",
            "role": "STATION_MASTER",
            "station_id": "550e8400-e29b-41d4-a716-446655440000"
        }))
        .unwrap();

        assert_eq!(request.role, AdminRole::StationMaster);
        assert!(request.validate().is_ok());
    }
}
