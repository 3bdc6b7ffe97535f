//! Modelo de User (cliente)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    /// Estado de verificación de identidad del cliente
    KycStatus {
        NotSubmitted => "NOT_SUBMITTED",
        Pending => "PENDING",
        Verified => "VERIFIED",
        Rejected => "REJECTED",
    }
}

/// Cliente - mapea a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub district: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub kyc_status: String,
    pub kyc_reference: Option<String>,
    pub kyc_document_last4: Option<String>,
    pub kyc_submitted_at: Option<DateTime<Utc>>,
    pub kyc_verified_at: Option<DateTime<Utc>>,
    pub kyc_rejection_reason: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn kyc_status(&self) -> KycStatus {
        self.kyc_status.parse().unwrap_or(KycStatus::NotSubmitted)
    }
}
