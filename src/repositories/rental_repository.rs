use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{Rental, RentalPaymentStatus, RentalStatus};
use crate::services::pricing_service::{AdditionalCharge, CostBreakdown};
use crate::utils::errors::AppError;
use crate::utils::pagination::Pagination;

/// Reserva a insertar
#[derive(Debug, Clone)]
pub struct NewRental {
    pub user_id: Uuid,
    pub vehicle_id: Uuid,
    pub pickup_station_id: Uuid,
    pub return_station_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub breakdown: CostBreakdown,
    pub discount_code: Option<String>,
    pub notes: Option<String>,
}

/// Datos registrados al recoger el vehículo
#[derive(Debug, Clone)]
pub struct StartRecord {
    pub actual_start_date: DateTime<Utc>,
    pub initial_charge_level: Option<i32>,
    pub initial_odometer: Option<f64>,
    pub pre_rental_inspection: Option<serde_json::Value>,
}

/// Datos registrados al devolver el vehículo
#[derive(Debug, Clone)]
pub struct CompletionRecord {
    pub actual_end_date: DateTime<Utc>,
    pub final_charge_level: Option<i32>,
    pub final_odometer: Option<f64>,
    pub post_rental_inspection: Option<serde_json::Value>,
    pub additional_charges: Vec<AdditionalCharge>,
    pub total_cost: rust_decimal::Decimal,
    pub loyalty_points_earned: i32,
}

/// Columnas por las que se puede ordenar el historial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentalSortField {
    StartDate,
    EndDate,
    CreatedAt,
    TotalCost,
    BookingDate,
}

impl RentalSortField {
    /// Campo desconocido → `end_date`
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("start_date") => RentalSortField::StartDate,
            Some("created_at") => RentalSortField::CreatedAt,
            Some("total_cost") => RentalSortField::TotalCost,
            _ => RentalSortField::EndDate,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            RentalSortField::StartDate => "start_date",
            RentalSortField::EndDate => "end_date",
            RentalSortField::CreatedAt => "created_at",
            RentalSortField::TotalCost => "total_cost",
            RentalSortField::BookingDate => "booking_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Solo `asc` ordena ascendente
    pub fn parse_or_desc(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Criterios de un listado de reservas
#[derive(Debug, Clone)]
pub struct RentalListQuery<'a> {
    pub user_id: Option<Uuid>,
    pub statuses: &'a [RentalStatus],
    pub station_id: Option<Uuid>,
    pub starting_after: Option<DateTime<Utc>>,
    pub sort: RentalSortField,
    pub direction: SortDirection,
}

const LIST_FILTER: &str = r#"
    ($1::UUID IS NULL OR user_id = $1)
    AND status = ANY($2)
    AND ($3::UUID IS NULL OR pickup_station_id = $3 OR return_station_id = $3)
    AND ($4::TIMESTAMPTZ IS NULL OR start_date > $4)
"#;

pub struct RentalRepository {
    pool: PgPool,
}

impl RentalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Rental>, AppError> {
        let rental = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rental)
    }

    /// Página de reservas y total de coincidencias
    pub async fn list(
        &self,
        query: &RentalListQuery<'_>,
        pagination: Pagination,
    ) -> Result<(Vec<Rental>, i64), AppError> {
        let statuses: Vec<&str> = query.statuses.iter().map(|s| s.as_str()).collect();

        let rentals = sqlx::query_as::<_, Rental>(&format!(
            "SELECT * FROM rentals WHERE {} ORDER BY {} {}, id ASC LIMIT $5 OFFSET $6",
            LIST_FILTER,
            query.sort.column(),
            query.direction.keyword()
        ))
        .bind(query.user_id)
        .bind(statuses.clone())
        .bind(query.station_id)
        .bind(query.starting_after)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM rentals WHERE {}", LIST_FILTER))
            .bind(query.user_id)
            .bind(statuses)
            .bind(query.station_id)
            .bind(query.starting_after)
            .fetch_one(&self.pool)
            .await?;

        Ok((rentals, total.0))
    }

    /// Bloquear la reserva hasta el fin de la transacción
    pub async fn lock_for_update(conn: &mut PgConnection, id: Uuid) -> Result<Option<Rental>, AppError> {
        let rental = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(rental)
    }

    /// Alguna reserva bloqueante del vehículo solapa la ventana (intervalos cerrados)
    pub async fn has_overlap(
        conn: &mut PgConnection,
        vehicle_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let blocking: Vec<&str> = RentalStatus::BLOCKING.iter().map(|s| s.as_str()).collect();
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM rentals
                WHERE vehicle_id = $1
                  AND status = ANY($2)
                  AND start_date <= $4
                  AND end_date >= $3
            )
            "#,
        )
        .bind(vehicle_id)
        .bind(blocking)
        .bind(start)
        .bind(end)
        .fetch_one(conn)
        .await?;

        Ok(result.0)
    }

    pub async fn insert(conn: &mut PgConnection, rental: NewRental) -> Result<Rental, AppError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, Rental>(
            r#"
            INSERT INTO rentals (id, user_id, vehicle_id, pickup_station_id, return_station_id,
                                 booking_date, start_date, end_date, status, rental_cost, discount,
                                 discount_code, tax_amount, additional_charges, total_cost,
                                 payment_status, loyalty_points_earned, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, '[]'::jsonb, $14, $15, 0, $16, $6, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(rental.user_id)
        .bind(rental.vehicle_id)
        .bind(rental.pickup_station_id)
        .bind(rental.return_station_id)
        .bind(now)
        .bind(rental.start_date)
        .bind(rental.end_date)
        .bind(RentalStatus::PendingApproval.as_str())
        .bind(rental.breakdown.rental_cost)
        .bind(rental.breakdown.discount)
        .bind(rental.discount_code)
        .bind(rental.breakdown.tax_amount)
        .bind(rental.breakdown.total_cost)
        .bind(RentalPaymentStatus::Pending.as_str())
        .bind(rental.notes)
        .fetch_one(conn)
        .await?;

        Ok(created)
    }

    /// Aprobar o rechazar; el motivo del rechazo se guarda en `cancellation_reason`
    pub async fn record_review(
        conn: &mut PgConnection,
        id: Uuid,
        status: RentalStatus,
        admin_id: Uuid,
        reason: Option<&str>,
    ) -> Result<Rental, AppError> {
        let now = Utc::now();
        let rental = sqlx::query_as::<_, Rental>(
            r#"
            UPDATE rentals
            SET status = $2, approved_by = $3, approval_date = $4,
                cancellation_reason = COALESCE($5, cancellation_reason), updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(admin_id)
        .bind(now)
        .bind(reason)
        .fetch_one(conn)
        .await?;

        Ok(rental)
    }

    pub async fn record_cancellation(
        conn: &mut PgConnection,
        id: Uuid,
        reason: Option<&str>,
    ) -> Result<Rental, AppError> {
        let rental = sqlx::query_as::<_, Rental>(
            r#"
            UPDATE rentals
            SET status = $2, cancellation_reason = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(RentalStatus::Cancelled.as_str())
        .bind(reason)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(rental)
    }

    pub async fn record_start(conn: &mut PgConnection, id: Uuid, record: StartRecord) -> Result<Rental, AppError> {
        let rental = sqlx::query_as::<_, Rental>(
            r#"
            UPDATE rentals
            SET status = $2, actual_start_date = $3, initial_charge_level = $4,
                initial_odometer = $5, pre_rental_inspection = $6, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(RentalStatus::Active.as_str())
        .bind(record.actual_start_date)
        .bind(record.initial_charge_level)
        .bind(record.initial_odometer)
        .bind(record.pre_rental_inspection)
        .fetch_one(conn)
        .await?;

        Ok(rental)
    }

    pub async fn record_completion(
        conn: &mut PgConnection,
        id: Uuid,
        record: CompletionRecord,
    ) -> Result<Rental, AppError> {
        let charges = serde_json::to_value(&record.additional_charges)
            .map_err(|e| AppError::Internal(format!("Error serializing charges: {}", e)))?;

        let rental = sqlx::query_as::<_, Rental>(
            r#"
            UPDATE rentals
            SET status = $2, actual_end_date = $3, final_charge_level = $4, final_odometer = $5,
                post_rental_inspection = $6, additional_charges = $7, total_cost = $8,
                loyalty_points_earned = $9, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(RentalStatus::Completed.as_str())
        .bind(record.actual_end_date)
        .bind(record.final_charge_level)
        .bind(record.final_odometer)
        .bind(record.post_rental_inspection)
        .bind(charges)
        .bind(record.total_cost)
        .bind(record.loyalty_points_earned)
        .fetch_one(conn)
        .await?;

        Ok(rental)
    }

    /// Actualizar el estado de pago; los ids ausentes conservan su valor
    pub async fn set_payment_state(
        conn: &mut PgConnection,
        id: Uuid,
        payment_status: RentalPaymentStatus,
        pre_authorization_id: Option<Uuid>,
        payment_id: Option<Uuid>,
    ) -> Result<Rental, AppError> {
        let rental = sqlx::query_as::<_, Rental>(
            r#"
            UPDATE rentals
            SET payment_status = $2,
                pre_authorization_id = COALESCE($3, pre_authorization_id),
                payment_id = COALESCE($4, payment_id),
                updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payment_status.as_str())
        .bind(pre_authorization_id)
        .bind(payment_id)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(rental)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_defaults_to_end_date() {
        assert_eq!(RentalSortField::parse_or_default(None), RentalSortField::EndDate);
        assert_eq!(RentalSortField::parse_or_default(Some("total_cost")), RentalSortField::TotalCost);
        assert_eq!(RentalSortField::parse_or_default(Some("START_DATE")), RentalSortField::StartDate);
        assert_eq!(
            RentalSortField::parse_or_default(Some("id; DROP TABLE rentals")),
            RentalSortField::EndDate
        );
    }

    #[test]
    fn test_sort_direction_defaults_to_desc() {
        assert_eq!(SortDirection::parse_or_desc(Some("ASC")), SortDirection::Asc);
        assert_eq!(SortDirection::parse_or_desc(Some("random")), SortDirection::Desc);
        assert_eq!(SortDirection::parse_or_desc(None), SortDirection::Desc);
    }
}
