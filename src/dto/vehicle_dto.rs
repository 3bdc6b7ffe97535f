use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::{LoyaltyTier, VehicleStatus, VehicleType};

pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;

#[derive(Debug, Default, Deserialize)]
pub struct VehicleListQuery {
    pub vehicle_type: Option<VehicleType>,
    pub min_range: Option<i32>,
    pub max_hourly_rate: Option<Decimal>,
    pub status: Option<VehicleStatus>,
    pub station_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NearbyQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub model: String,

    #[validate(custom = "crate::utils::validation::validate_vin")]
    pub vin_number: String,

    pub vehicle_type: VehicleType,

    #[validate(range(min = 0.0))]
    pub battery_capacity: Option<f64>,

    #[validate(range(min = 0))]
    pub range_km: Option<i32>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub station_id: Option<Uuid>,

    #[validate(custom = "crate::utils::validation::validate_positive_amount")]
    pub hourly_rate: Decimal,

    #[validate(custom = "crate::utils::validation::validate_positive_amount")]
    pub daily_rate: Decimal,

    #[validate(custom = "crate::utils::validation::validate_positive_amount")]
    pub weekly_rate: Option<Decimal>,

    #[validate(custom = "crate::utils::validation::validate_non_negative_amount")]
    pub security_deposit_amount: Option<Decimal>,

    pub image_urls: Option<Vec<String>>,

    pub min_loyalty_tier: Option<LoyaltyTier>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(custom = "crate::utils::validation::validate_vin")]
    pub vin_number: Option<String>,

    pub vehicle_type: Option<VehicleType>,

    #[validate(range(min = 0.0))]
    pub battery_capacity: Option<f64>,

    #[validate(range(min = 0))]
    pub range_km: Option<i32>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    pub station_id: Option<Uuid>,

    #[validate(custom = "crate::utils::validation::validate_positive_amount")]
    pub hourly_rate: Option<Decimal>,

    #[validate(custom = "crate::utils::validation::validate_positive_amount")]
    pub daily_rate: Option<Decimal>,

    #[validate(custom = "crate::utils::validation::validate_positive_amount")]
    pub weekly_rate: Option<Decimal>,

    #[validate(custom = "crate::utils::validation::validate_non_negative_amount")]
    pub security_deposit_amount: Option<Decimal>,

    pub image_urls: Option<Vec<String>>,

    pub min_loyalty_tier: Option<LoyaltyTier>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVehicleStatusRequest {
    pub status: VehicleStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(vin: &str, hourly: &str) -> CreateVehicleRequest {
        serde_json::from_value(serde_json::json!({
            "model": "Nexon EV",
            "vin_number": vin,
            "vehicle_type": "CAR",
            "hourly_rate": hourly,
            "daily_rate": "1500.00",
            "min_loyalty_tier": "SILVER"
        }))
        .unwrap()
    }

    #[test]
    fn test_create_vehicle_validation() {
        let ok = create_request("1HGCM82633A004352", "120.00");
        assert!(ok.validate().is_ok());
        assert_eq!(ok.min_loyalty_tier, Some(LoyaltyTier::Silver));

        let bad_vin = create_request("1HGCM82633A00435Q", "120.00");
        assert!(bad_vin.validate().unwrap_err().field_errors().contains_key("vin_number"));

        let bad_rate = create_request("1HGCM82633A004352", "0");
        assert!(bad_rate.validate().unwrap_err().field_errors().contains_key("hourly_rate"));
    }
}
