//! Modelos de pagos internos: pre-autorizaciones y cobros

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    AuthorizationStatus {
        Pending => "PENDING",
        Authorized => "AUTHORIZED",
        Captured => "CAPTURED",
        Voided => "VOIDED",
        Failed => "FAILED",
    }
}

text_enum! {
    PaymentStatus {
        Pending => "PENDING",
        Completed => "COMPLETED",
        Failed => "FAILED",
        Refunded => "REFUNDED",
        PartiallyRefunded => "PARTIALLY_REFUNDED",
    }
}

text_enum! {
    PaymentType {
        RentalCharge => "RENTAL_CHARGE",
        AdditionalCharge => "ADDITIONAL_CHARGE",
        DamageCharge => "DAMAGE_CHARGE",
        Refund => "REFUND",
    }
}

/// Procesador registrado en los pagos internos
pub const INTERNAL_PROCESSOR: &str = "INTERNAL";

/// Moneda por defecto
pub const DEFAULT_CURRENCY: &str = "INR";

/// Retención de fondos asociada a una reserva - tabla payment_authorizations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentAuthorization {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rental_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub authorization_code: String,
    pub authorization_reference: String,
    pub payment_method_ref: Option<String>,
    pub authorization_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub captured_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentAuthorization {
    pub fn is_active_hold(&self) -> bool {
        self.status == AuthorizationStatus::Authorized.as_str()
    }
}

/// Pago registrado - tabla payments
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rental_id: Option<Uuid>,
    pub authorization_id: Option<Uuid>,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub payment_type: String,
    pub transaction_reference: String,
    pub payment_date: Option<DateTime<Utc>>,
    pub refunded_amount: Decimal,
    pub refund_reason: Option<String>,
    pub payment_processor: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
