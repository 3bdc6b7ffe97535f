use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{LoyaltyTier, Rental, Station, Vehicle};
use crate::services::pricing_service::{AdditionalCharge, CostBreakdown};
use crate::utils::pagination::PaginationQuery;

/// Reserva nueva o presupuesto
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRentalRequest {
    pub vehicle_id: Uuid,
    pub pickup_station_id: Uuid,
    pub return_station_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    #[validate(length(max = 50))]
    pub discount_code: Option<String>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub vehicle_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub duration_hours: i64,
    #[serde(flatten)]
    pub breakdown: CostBreakdown,
    pub security_deposit_amount: Decimal,
}

/// Reserva con su vehículo y estaciones
#[derive(Debug, Serialize)]
pub struct RentalDetailResponse {
    #[serde(flatten)]
    pub rental: Rental,
    pub vehicle: Option<Vehicle>,
    pub pickup_station: Option<Station>,
    pub return_station: Option<Station>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CancelRentalRequest {
    #[validate(length(max = 500))]
    pub cancellation_reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelRentalResponse {
    pub rental_id: Uuid,
    pub status: String,
    pub refund_amount: Decimal,
    pub refund_status: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct DeclineRentalRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct StartRentalRequest {
    #[validate(range(min = 0, max = 100))]
    pub initial_charge_level: Option<i32>,

    #[validate(range(min = 0.0))]
    pub initial_odometer: Option<f64>,

    pub pre_rental_inspection: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CompleteRentalRequest {
    #[validate(range(min = 0, max = 100))]
    pub final_charge_level: Option<i32>,

    #[validate(range(min = 0.0))]
    pub final_odometer: Option<f64>,

    pub post_rental_inspection: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct RentalCompletionResponse {
    pub rental: Rental,
    pub additional_charges: Vec<AdditionalCharge>,
    pub distance_traveled: Option<f64>,
    pub loyalty_points_earned: i32,
    pub loyalty_tier: LoyaltyTier,
}

/// Query del historial: paginación y orden
#[derive(Debug, Default, Deserialize)]
pub struct PastRentalsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl PastRentalsQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rental_parses_rfc3339_dates() {
        let request: CreateRentalRequest = serde_json::from_value(serde_json::json!({
            "vehicle_id": "550e8400-e29b-41d4-a716-446655440000",
            "pickup_station_id": "550e8400-e29b-41d4-a716-446655440001",
            "return_station_id": "550e8400-e29b-41d4-a716-446655440002",
            "start_date": "2030-01-01T10:00:00Z",
            "end_date": "2030-01-02T10:00:00+05:30",
            "discount_code": "WELCOME"
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert!(request.end_date > request.start_date);
    }

    #[test]
    fn test_start_rental_charge_level_bounds() {
        let request = StartRentalRequest {
            initial_charge_level: Some(120),
            ..Default::default()
        };
        assert!(request.validate().unwrap_err().field_errors().contains_key("initial_charge_level"));
    }
}
