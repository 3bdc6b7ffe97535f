use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{LoyaltyTier, RentalStatus, Vehicle, VehicleStatus, VehicleType};
use crate::utils::errors::AppError;

/// Filtros del listado de vehículos
#[derive(Debug, Clone)]
pub struct VehicleFilter {
    pub vehicle_type: Option<VehicleType>,
    pub min_range: Option<i32>,
    pub max_hourly_rate: Option<Decimal>,
    pub status: Option<VehicleStatus>,
    pub station_id: Option<Uuid>,
}

/// Campos editables de un vehículo
#[derive(Debug, Clone)]
pub struct VehicleFields {
    pub model: String,
    pub vin_number: String,
    pub vehicle_type: VehicleType,
    pub battery_capacity: Option<f64>,
    pub range_km: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub station_id: Option<Uuid>,
    pub hourly_rate: Decimal,
    pub daily_rate: Decimal,
    pub weekly_rate: Option<Decimal>,
    pub security_deposit_amount: Decimal,
    pub image_urls: serde_json::Value,
    pub min_loyalty_tier: LoyaltyTier,
}

/// Caja geográfica para búsquedas de proximidad
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &VehicleFilter) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE ($1::TEXT IS NULL OR vehicle_type = $1)
              AND ($2::INTEGER IS NULL OR range_km >= $2)
              AND ($3::NUMERIC IS NULL OR hourly_rate <= $3)
              AND ($4::TEXT IS NULL OR status = $4)
              AND ($5::UUID IS NULL OR station_id = $5)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.vehicle_type.map(|t| t.as_str()))
        .bind(filter.min_range)
        .bind(filter.max_hourly_rate)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.station_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    /// Vehículos disponibles dentro de la caja
    pub async fn find_available_in_box(&self, bounds: BoundingBox) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE status = $1
              AND latitude BETWEEN $2 AND $3
              AND longitude BETWEEN $4 AND $5
            "#,
        )
        .bind(VehicleStatus::Available.as_str())
        .bind(bounds.min_lat)
        .bind(bounds.max_lat)
        .bind(bounds.min_lon)
        .bind(bounds.max_lon)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    pub async fn distinct_types(&self) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT vehicle_type FROM vehicles ORDER BY vehicle_type")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(t,)| t).collect())
    }

    pub async fn vin_exists(&self, vin: &str, exclude: Option<Uuid>) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE vin_number = $1 AND ($2::UUID IS NULL OR id <> $2))",
        )
        .bind(vin)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn create(&self, fields: VehicleFields) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, model, vin_number, vehicle_type, battery_capacity, range_km, status,
                                  latitude, longitude, station_id, hourly_rate, daily_rate, weekly_rate,
                                  security_deposit_amount, image_urls, total_rentals, total_distance,
                                  min_loyalty_tier, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, 0, 0, $16, $17, $17)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fields.model)
        .bind(fields.vin_number)
        .bind(fields.vehicle_type.as_str())
        .bind(fields.battery_capacity)
        .bind(fields.range_km)
        .bind(VehicleStatus::Available.as_str())
        .bind(fields.latitude)
        .bind(fields.longitude)
        .bind(fields.station_id)
        .bind(fields.hourly_rate)
        .bind(fields.daily_rate)
        .bind(fields.weekly_rate)
        .bind(fields.security_deposit_amount)
        .bind(fields.image_urls)
        .bind(fields.min_loyalty_tier.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn update(&self, id: Uuid, fields: VehicleFields) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET model = $2, vin_number = $3, vehicle_type = $4, battery_capacity = $5, range_km = $6,
                latitude = $7, longitude = $8, station_id = $9, hourly_rate = $10, daily_rate = $11,
                weekly_rate = $12, security_deposit_amount = $13, image_urls = $14,
                min_loyalty_tier = $15, updated_at = $16
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.model)
        .bind(fields.vin_number)
        .bind(fields.vehicle_type.as_str())
        .bind(fields.battery_capacity)
        .bind(fields.range_km)
        .bind(fields.latitude)
        .bind(fields.longitude)
        .bind(fields.station_id)
        .bind(fields.hourly_rate)
        .bind(fields.daily_rate)
        .bind(fields.weekly_rate)
        .bind(fields.security_deposit_amount)
        .bind(fields.image_urls)
        .bind(fields.min_loyalty_tier.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    /// Borrar el vehículo dentro de la transacción que lo tiene bloqueado
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reservas del vehículo con alguno de los estados dados
    pub async fn count_rentals_with_status(
        conn: &mut PgConnection,
        id: Uuid,
        statuses: &[RentalStatus],
    ) -> Result<i64, AppError> {
        let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM rentals WHERE vehicle_id = $1 AND status = ANY($2)")
                .bind(id)
                .bind(statuses)
                .fetch_one(conn)
                .await?;

        Ok(result.0)
    }

    /// Bloquear la fila del vehículo hasta el fin de la transacción
    pub async fn lock_for_update(conn: &mut PgConnection, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(vehicle)
    }

    pub async fn set_status(conn: &mut PgConnection, id: Uuid, status: VehicleStatus) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            "UPDATE vehicles SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(vehicle)
    }

    /// Devolver el vehículo a una estación tras un alquiler
    pub async fn record_return(
        conn: &mut PgConnection,
        id: Uuid,
        station_id: Uuid,
        station_position: (f64, f64),
        distance: f64,
    ) -> Result<Vehicle, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET status = $2, station_id = $3, latitude = $4, longitude = $5,
                total_rentals = total_rentals + 1, total_distance = total_distance + $6,
                updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(VehicleStatus::Available.as_str())
        .bind(station_id)
        .bind(station_position.0)
        .bind(station_position.1)
        .bind(distance)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(vehicle)
    }
}

impl BoundingBox {
    /// Aproximación por grados: ±0.009·r de latitud y ±0.011·r de longitud
    pub fn around(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        let lat_delta = 0.009 * radius_km;
        let lon_delta = 0.011 * radius_km;
        Self {
            min_lat: latitude - lat_delta,
            max_lat: latitude + lat_delta,
            min_lon: longitude - lon_delta,
            max_lon: longitude + lon_delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_scales_with_radius() {
        let bounds = BoundingBox::around(28.0, 77.0, 10.0);
        assert!((bounds.min_lat - 27.91).abs() < 1e-9);
        assert!((bounds.max_lat - 28.09).abs() < 1e-9);
        assert!((bounds.min_lon - 76.89).abs() < 1e-9);
        assert!((bounds.max_lon - 77.11).abs() < 1e-9);
    }
}
