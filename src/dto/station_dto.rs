use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::Station;

pub const DEFAULT_STATION_LIMIT: i64 = 10;
pub const MAX_STATION_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct StationListQuery {
    pub is_active: Option<bool>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub has_charging: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl StationListQuery {
    /// (limit, offset) acotados
    pub fn window(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_STATION_LIMIT).clamp(1, MAX_STATION_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[derive(Debug, Serialize)]
pub struct StationListResponse {
    pub stations: Vec<Station>,
    pub count: usize,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStationRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 255))]
    pub street: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 20))]
    pub zip_code: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,

    pub latitude: f64,
    pub longitude: f64,

    #[validate(custom = "crate::utils::validation::validate_phone")]
    pub contact_phone: Option<String>,

    #[validate(email)]
    pub contact_email: Option<String>,

    pub operating_hours: Option<serde_json::Value>,

    #[validate(range(min = 0))]
    pub capacity: Option<i32>,

    #[validate(range(min = 0))]
    pub available_spots: Option<i32>,

    #[validate(range(min = 0))]
    pub charging_stations: Option<i32>,

    pub station_master_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateStationRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 255))]
    pub street: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(max = 20))]
    pub zip_code: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    #[validate(custom = "crate::utils::validation::validate_phone")]
    pub contact_phone: Option<String>,

    #[validate(email)]
    pub contact_email: Option<String>,

    pub operating_hours: Option<serde_json::Value>,

    #[validate(range(min = 0))]
    pub capacity: Option<i32>,

    #[validate(range(min = 0))]
    pub available_spots: Option<i32>,

    #[validate(range(min = 0))]
    pub charging_stations: Option<i32>,

    pub station_master_id: Option<Uuid>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAvailabilityRequest {
    #[validate(range(min = 0))]
    pub available_spots: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_window_is_clamped() {
        assert_eq!(StationListQuery::default().window(), (10, 0));

        let query = StationListQuery {
            limit: Some(1_000),
            offset: Some(-5),
            ..Default::default()
        };
        assert_eq!(query.window(), (100, 0));
    }

    #[test]
    fn test_create_station_validates_contact_fields() {
        let request: CreateStationRequest = serde_json::from_value(serde_json::json!({
            "name": "Connaught Place Hub",
            "latitude": 28.63,
            "longitude": 77.22,
            "contact_email": "not-an-email",
            "capacity": -1
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("contact_email"));
        assert!(errors.field_errors().contains_key("capacity"));
    }
}
