//! Modelo de Vehicle
//!
//! Vehículos eléctricos del inventario con sus tarifas y el nivel
//! mínimo de fidelización requerido para reservarlos.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{LoyaltyTier, ParseEnumError};
use crate::services::pricing_service::RentalRates;

text_enum! {
    /// Tipo de vehículo
    VehicleType {
        Car => "CAR",
        Scooter => "SCOOTER",
        Bike => "BIKE",
        Motorcycle => "MOTORCYCLE",
    }
}

text_enum! {
    /// Estado operativo del vehículo
    VehicleStatus {
        Available => "AVAILABLE",
        Rented => "RENTED",
        Maintenance => "MAINTENANCE",
        Charging => "CHARGING",
        OutOfService => "OUT_OF_SERVICE",
    }
}

/// Vehicle principal - mapea a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub model: String,
    pub vin_number: String,
    pub vehicle_type: String,
    pub battery_capacity: Option<f64>,
    pub range_km: Option<i32>,
    pub status: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub station_id: Option<Uuid>,
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
    pub weekly_rate: Option<Decimal>,
    pub security_deposit_amount: Decimal,
    pub image_urls: serde_json::Value,
    pub total_rentals: i32,
    pub total_distance: f64,
    pub min_loyalty_tier: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn status(&self) -> Result<VehicleStatus, ParseEnumError> {
        self.status.parse()
    }

    pub fn min_loyalty_tier(&self) -> LoyaltyTier {
        self.min_loyalty_tier.parse().unwrap_or(LoyaltyTier::Basic)
    }

    pub fn rates(&self) -> RentalRates {
        RentalRates {
            hourly_rate: self.hourly_rate,
            daily_rate: self.daily_rate,
            weekly_rate: self.weekly_rate,
        }
    }
}
