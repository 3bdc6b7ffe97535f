//! Modelo de Station

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estación de recogida y devolución - mapea a la tabla stations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Station {
    pub id: Uuid,
    pub name: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub operating_hours: serde_json::Value,
    pub capacity: i32,
    pub available_spots: i32,
    pub charging_stations: i32,
    pub station_master_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
