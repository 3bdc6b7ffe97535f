//! Utilidades JWT
//!
//! Emisión y verificación de tokens de acceso y de refresco. Los clientes
//! llevan el rol `USER`; el personal lleva su `AdminRole` y su estación.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::environment::EnvironmentConfig,
    models::{Actor, AdminRole},
    utils::errors::AppError,
};

/// Rol de los clientes en los claims
pub const CUSTOMER_ROLE: &str = "USER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims del JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    pub token_type: TokenType,
    pub exp: usize,
    pub iat: usize,
}

impl JwtClaims {
    /// Principal descrito por los claims
    pub fn actor(&self) -> Result<Actor, AppError> {
        let id = Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;

        if self.role == CUSTOMER_ROLE {
            return Ok(Actor::Customer { user_id: id });
        }

        let role: AdminRole = self
            .role
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid token role".to_string()))?;
        let station_id = match &self.station_id {
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| AppError::Unauthorized("Invalid token station".to_string()))?,
            ),
            None => None,
        };

        Ok(Actor::Staff {
            admin_id: id,
            role,
            station_id,
        })
    }
}

/// Configuración de JWT
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration: u64,
    pub refresh_expiration: u64,
}

impl From<&EnvironmentConfig> for JwtConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration: config.jwt_expiration,
            refresh_expiration: config.jwt_refresh_expiration,
        }
    }
}

/// Par de tokens devuelto en login
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

fn claims_for(actor: &Actor, token_type: TokenType, ttl_seconds: u64) -> JwtClaims {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::seconds(ttl_seconds as i64);

    let (role, station_id) = match actor {
        Actor::Customer { .. } => (CUSTOMER_ROLE.to_string(), None),
        Actor::Staff { role, station_id, .. } => {
            (role.as_str().to_string(), station_id.map(|id| id.to_string()))
        }
    };

    JwtClaims {
        sub: actor.id().to_string(),
        role,
        station_id,
        token_type,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    }
}

/// Generar un token para el principal
pub fn generate_token(actor: &Actor, token_type: TokenType, config: &JwtConfig) -> Result<String, AppError> {
    let ttl = match token_type {
        TokenType::Access => config.expiration,
        TokenType::Refresh => config.refresh_expiration,
    };
    let claims = claims_for(actor, token_type, ttl);
    let encoding_key = EncodingKey::from_secret(config.secret.as_ref());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| AppError::Jwt(format!("Error generating token: {}", e)))
}

/// Generar token de acceso y de refresco
pub fn generate_token_pair(actor: &Actor, config: &JwtConfig) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: generate_token(actor, TokenType::Access, config)?,
        refresh_token: generate_token(actor, TokenType::Refresh, config)?,
        token_type: "Bearer",
        expires_in: config.expiration,
    })
}

/// Verificar y decodificar JWT token
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<JwtClaims, AppError> {
    validate_token_format(token)?;
    let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

    let token_data = decode::<JwtClaims>(token, &decoding_key, &Validation::default())
        .map_err(|e| AppError::Jwt(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}

/// Verificar un token y exigir su tipo
pub fn verify_token_of_type(
    token: &str,
    expected: TokenType,
    config: &JwtConfig,
) -> Result<JwtClaims, AppError> {
    let claims = verify_token(token, config)?;
    if claims.token_type != expected {
        return Err(AppError::Jwt(match expected {
            TokenType::Access => "Refresh tokens cannot be used for authentication".to_string(),
            TokenType::Refresh => "An access token cannot be used to refresh".to_string(),
        }));
    }
    Ok(claims)
}

/// Validar formato de token (básico)
pub fn validate_token_format(token: &str) -> Result<(), AppError> {
    if token.is_empty() {
        return Err(AppError::Jwt("Token cannot be empty".to_string()));
    }

    if token.split('.').count() != 3 {
        return Err(AppError::Jwt("Malformed token".to_string()));
    }

    Ok(())
}

/// Extraer token del header Authorization
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Authorization header must use the Bearer scheme".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Authorization token is required".to_string()));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            expiration: 3600,
            refresh_expiration: 7200,
        }
    }

    #[test]
    fn test_customer_token_round_trip() {
        let user_id = Uuid::new_v4();
        let actor = Actor::Customer { user_id };
        let token = generate_token(&actor, TokenType::Access, &config()).unwrap();

        let claims = verify_token(&token, &config()).unwrap();
        assert_eq!(claims.role, CUSTOMER_ROLE);
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.station_id.is_none());
        assert_eq!(claims.actor().unwrap(), actor);
    }

    #[test]
    fn test_staff_claims_carry_role_and_station() {
        let actor = Actor::Staff {
            admin_id: Uuid::new_v4(),
            role: AdminRole::StationMaster,
            station_id: Some(Uuid::new_v4()),
        };
        let pair = generate_token_pair(&actor, &config()).unwrap();
        assert_eq!(pair.expires_in, 3600);

        let claims = verify_token(&pair.access_token, &config()).unwrap();
        assert_eq!(claims.role, "STATION_MASTER");
        assert_eq!(claims.actor().unwrap(), actor);

        let refresh = verify_token(&pair.refresh_token, &config()).unwrap();
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert!(refresh.exp > claims.exp);
    }

    #[test]
    fn test_token_type_is_enforced() {
        let actor = Actor::Customer { user_id: Uuid::new_v4() };
        let pair = generate_token_pair(&actor, &config()).unwrap();

        assert!(verify_token_of_type(&pair.access_token, TokenType::Access, &config()).is_ok());
        assert!(verify_token_of_type(&pair.refresh_token, TokenType::Access, &config()).is_err());
        assert!(verify_token_of_type(&pair.access_token, TokenType::Refresh, &config()).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let actor = Actor::Customer { user_id: Uuid::new_v4() };
        let token = generate_token(&actor, TokenType::Access, &config()).unwrap();
        let other = JwtConfig {
            secret: "other".to_string(),
            ..config()
        };
        assert!(matches!(verify_token(&token, &other), Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(extract_token_from_header("Basic abc").is_err());
        assert!(extract_token_from_header("Bearer ").is_err());
        assert!(validate_token_format("not-a-jwt").is_err());
    }
}
