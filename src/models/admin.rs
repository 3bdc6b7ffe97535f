//! Modelo de Admin (personal de la plataforma)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ParseEnumError;

text_enum! {
    /// Rol del personal
    AdminRole {
        SuperAdmin => "SUPER_ADMIN",
        StationMaster => "STATION_MASTER",
        SupportStaff => "SUPPORT_STAFF",
        FinanceAdmin => "FINANCE_ADMIN",
    }
}

/// Admin - mapea a la tabla admins
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub station_id: Option<Uuid>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn role(&self) -> Result<AdminRole, ParseEnumError> {
        self.role.parse()
    }
}
