//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use crate::services::pricing_service::PricingPolicy;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub jwt_refresh_expiration: u64,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    pub require_kyc_for_rental: bool,
    pub preauth_validity_days: i64,
    pub run_migrations: bool,
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
    pub pricing: PricingPolicy,
}

impl EnvironmentConfig {
    /// Cargar la configuración desde variables de entorno
    pub fn from_env() -> Result<Self> {
        let defaults = PricingPolicy::default();

        let pricing = PricingPolicy {
            tax_rate: parse_or("TAX_RATE", defaults.tax_rate)?,
            discount_code_rate: parse_or("DISCOUNT_CODE_RATE", defaults.discount_code_rate)?,
            late_fee_multiplier: parse_or("LATE_FEE_MULTIPLIER", defaults.late_fee_multiplier)?,
            ..defaults
        };

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: parse_or("PORT", 3000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expiration: parse_or("JWT_EXPIRATION", 3600)?,
            jwt_refresh_expiration: parse_or("JWT_REFRESH_EXPIRATION", 604_800)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| split_origins(&origins))
                .unwrap_or_default(),
            rate_limit_requests: parse_or("RATE_LIMIT_REQUESTS", 100)?,
            rate_limit_window: parse_or("RATE_LIMIT_WINDOW", 60)?,
            require_kyc_for_rental: parse_or("REQUIRE_KYC_FOR_RENTAL", false)?,
            preauth_validity_days: parse_or("PREAUTH_VALIDITY_DAYS", 7)?,
            run_migrations: parse_or("RUN_MIGRATIONS", true)?,
            bootstrap_admin_email: env::var("BOOTSTRAP_ADMIN_EMAIL").ok().filter(|v| !v.is_empty()),
            bootstrap_admin_password: env::var("BOOTSTRAP_ADMIN_PASSWORD").ok().filter(|v| !v.is_empty()),
            pricing,
        })
    }

    /// Configuración mínima para tests
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            environment: "test".to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            jwt_secret: jwt_secret.to_string(),
            jwt_expiration: 3600,
            jwt_refresh_expiration: 604_800,
            cors_origins: Vec::new(),
            rate_limit_requests: 100,
            rate_limit_window: 60,
            require_kyc_for_rental: false,
            preauth_validity_days: 7,
            run_migrations: false,
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
            pricing: PricingPolicy::default(),
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid value, got '{}'", key, raw)),
        _ => Ok(default),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_origins() {
        let origins = split_origins("http://a.com, http://b.com,,");
        assert_eq!(origins, vec!["http://a.com".to_string(), "http://b.com".to_string()]);
    }

    #[test]
    fn test_server_url() {
        let config = EnvironmentConfig::for_tests("secret");
        assert_eq!(config.server_url(), "127.0.0.1:0");
        assert!(!config.is_development());
    }
}
