use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::Station;
use crate::utils::errors::AppError;

/// Filtros del listado de estaciones
#[derive(Debug, Default, Clone)]
pub struct StationFilter {
    pub is_active: Option<bool>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub has_charging: Option<bool>,
}

/// Campos de una estación nueva o actualizada
#[derive(Debug, Clone)]
pub struct StationFields {
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
}

const FILTER_CLAUSE: &str = r#"
    ($1::BOOLEAN IS NULL OR is_active = $1)
    AND ($2::TEXT IS NULL OR city ILIKE '%' || $2 || '%')
    AND ($3::TEXT IS NULL OR state ILIKE '%' || $3 || '%')
    AND ($4::BOOLEAN IS NULL OR ($4 AND charging_stations > 0) OR (NOT $4 AND charging_stations = 0))
"#;

pub struct StationRepository {
    pool: PgPool,
}

impl StationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Listado filtrado junto al total sin paginar
    pub async fn list(
        &self,
        filter: &StationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Station>, i64), AppError> {
        let stations = sqlx::query_as::<_, Station>(&format!(
            "SELECT * FROM stations WHERE {} ORDER BY name ASC LIMIT $5 OFFSET $6",
            FILTER_CLAUSE
        ))
        .bind(filter.is_active)
        .bind(filter.city.as_deref())
        .bind(filter.state.as_deref())
        .bind(filter.has_charging)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM stations WHERE {}", FILTER_CLAUSE))
            .bind(filter.is_active)
            .bind(filter.city.as_deref())
            .bind(filter.state.as_deref())
            .bind(filter.has_charging)
            .fetch_one(&self.pool)
            .await?;

        Ok((stations, total.0))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Station>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::find_by_id_in(&mut conn, id).await
    }

    /// Buscar dentro de una transacción abierta
    pub async fn find_by_id_in(conn: &mut PgConnection, id: Uuid) -> Result<Option<Station>, AppError> {
        let station = sqlx::query_as::<_, Station>("SELECT * FROM stations WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(station)
    }

    pub async fn create(&self, fields: StationFields) -> Result<Station, AppError> {
        let station = sqlx::query_as::<_, Station>(
            r#"
            INSERT INTO stations (id, name, street, city, state, zip_code, country, latitude, longitude,
                                  contact_phone, contact_email, operating_hours, capacity, available_spots,
                                  charging_stations, station_master_id, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $18)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fields.name)
        .bind(fields.street)
        .bind(fields.city)
        .bind(fields.state)
        .bind(fields.zip_code)
        .bind(fields.country)
        .bind(fields.latitude)
        .bind(fields.longitude)
        .bind(fields.contact_phone)
        .bind(fields.contact_email)
        .bind(fields.operating_hours)
        .bind(fields.capacity)
        .bind(fields.available_spots)
        .bind(fields.charging_stations)
        .bind(fields.station_master_id)
        .bind(fields.is_active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(station)
    }

    pub async fn update(&self, id: Uuid, fields: StationFields) -> Result<Station, AppError> {
        let station = sqlx::query_as::<_, Station>(
            r#"
            UPDATE stations
            SET name = $2, street = $3, city = $4, state = $5, zip_code = $6, country = $7,
                latitude = $8, longitude = $9, contact_phone = $10, contact_email = $11,
                operating_hours = $12, capacity = $13, available_spots = $14,
                charging_stations = $15, station_master_id = $16, is_active = $17, updated_at = $18
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.name)
        .bind(fields.street)
        .bind(fields.city)
        .bind(fields.state)
        .bind(fields.zip_code)
        .bind(fields.country)
        .bind(fields.latitude)
        .bind(fields.longitude)
        .bind(fields.contact_phone)
        .bind(fields.contact_email)
        .bind(fields.operating_hours)
        .bind(fields.capacity)
        .bind(fields.available_spots)
        .bind(fields.charging_stations)
        .bind(fields.station_master_id)
        .bind(fields.is_active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(station)
    }

    /// Borrado lógico
    pub async fn deactivate(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE stations SET is_active = FALSE, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_availability(&self, id: Uuid, available_spots: i32) -> Result<Station, AppError> {
        let station = sqlx::query_as::<_, Station>(
            "UPDATE stations SET available_spots = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(available_spots)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(station)
    }
}
