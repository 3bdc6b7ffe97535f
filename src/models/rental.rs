//! Modelo de Rental
//!
//! Reserva de un vehículo entre dos estaciones. El campo `status` sigue
//! la máquina de estados de `services::rental_lifecycle`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::ParseEnumError;
use crate::services::pricing_service::CostBreakdown;

text_enum! {
    /// Estado de una reserva
    RentalStatus {
        PendingApproval => "PENDING_APPROVAL",
        Approved => "APPROVED",
        Active => "ACTIVE",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
        Declined => "DECLINED",
    }
}

impl RentalStatus {
    /// Estados que reservan el vehículo durante la ventana contratada
    pub const BLOCKING: [RentalStatus; 3] = [
        RentalStatus::PendingApproval,
        RentalStatus::Approved,
        RentalStatus::Active,
    ];

    pub fn is_blocking(&self) -> bool {
        Self::BLOCKING.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RentalStatus::Completed | RentalStatus::Cancelled | RentalStatus::Declined
        )
    }
}

text_enum! {
    /// Estado de pago de una reserva
    RentalPaymentStatus {
        Pending => "PENDING",
        Authorized => "AUTHORIZED",
        Paid => "PAID",
        Refunded => "REFUNDED",
        Failed => "FAILED",
    }
}

/// Rental - mapea a la tabla rentals
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rental {
    pub id: Uuid,
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub pickup_station_id: Uuid,
    pub return_station_id: Uuid,
    pub booking_date: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub actual_start_date: Option<DateTime<Utc>>,
    pub actual_end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub approved_by: Option<Uuid>,
    pub approval_date: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub initial_charge_level: Option<i32>,
    pub final_charge_level: Option<i32>,
    pub initial_odometer: Option<f64>,
    pub final_odometer: Option<f64>,
    pub pre_rental_inspection: Option<serde_json::Value>,
    pub post_rental_inspection: Option<serde_json::Value>,
    pub rental_cost: Decimal,
    pub discount: Decimal,
    pub discount_code: Option<String>,
    pub tax_amount: Decimal,
    pub additional_charges: serde_json::Value,
    pub total_cost: Decimal,
    pub payment_status: String,
    pub payment_id: Option<Uuid>,
    pub pre_authorization_id: Option<Uuid>,
    pub loyalty_points_earned: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rental {
    pub fn status(&self) -> Result<RentalStatus, ParseEnumError> {
        self.status.parse()
    }

    pub fn payment_status(&self) -> Result<RentalPaymentStatus, ParseEnumError> {
        self.payment_status.parse()
    }

    /// La reserva toca la estación (recogida o devolución)
    pub fn touches_station(&self, station_id: Uuid) -> bool {
        self.pickup_station_id == station_id || self.return_station_id == station_id
    }

    /// Desglose guardado al reservar
    pub fn cost_breakdown(&self) -> CostBreakdown {
        CostBreakdown {
            rental_cost: self.rental_cost,
            discount: self.discount,
            tax_amount: self.tax_amount,
            total_cost: self.total_cost,
        }
    }
}
