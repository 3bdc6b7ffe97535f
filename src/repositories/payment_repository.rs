use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::payment::{DEFAULT_CURRENCY, INTERNAL_PROCESSOR};
use crate::models::{AuthorizationStatus, Payment, PaymentAuthorization, PaymentStatus, PaymentType};
use crate::utils::errors::AppError;
use crate::utils::pagination::Pagination;

/// Retención nueva
#[derive(Debug, Clone)]
pub struct NewAuthorization {
    pub user_id: Uuid,
    pub rental_id: Uuid,
    pub amount: Decimal,
    pub authorization_code: String,
    pub authorization_reference: String,
    pub payment_method_ref: Option<String>,
    pub expiration_date: DateTime<Utc>,
}

/// Pago nuevo
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: Uuid,
    pub rental_id: Option<Uuid>,
    pub authorization_id: Option<Uuid>,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub payment_type: PaymentType,
    pub transaction_reference: String,
}

pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> Result<(Vec<Payment>, i64), AppError> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((payments, total.0))
    }

    pub async fn create_authorization(
        conn: &mut PgConnection,
        authorization: NewAuthorization,
    ) -> Result<PaymentAuthorization, AppError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, PaymentAuthorization>(
            r#"
            INSERT INTO payment_authorizations (id, user_id, rental_id, amount, currency, status,
                                                authorization_code, authorization_reference,
                                                payment_method_ref, authorization_date, expiration_date,
                                                captured_amount, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(authorization.user_id)
        .bind(authorization.rental_id)
        .bind(authorization.amount)
        .bind(DEFAULT_CURRENCY)
        .bind(AuthorizationStatus::Authorized.as_str())
        .bind(authorization.authorization_code)
        .bind(authorization.authorization_reference)
        .bind(authorization.payment_method_ref)
        .bind(now)
        .bind(authorization.expiration_date)
        .fetch_one(conn)
        .await?;

        Ok(created)
    }

    pub async fn find_authorization(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<PaymentAuthorization>, AppError> {
        let authorization = sqlx::query_as::<_, PaymentAuthorization>(
            "SELECT * FROM payment_authorizations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(authorization)
    }

    /// Cerrar una retención como capturada o anulada
    pub async fn settle_authorization(
        conn: &mut PgConnection,
        id: Uuid,
        status: AuthorizationStatus,
        captured_amount: Decimal,
    ) -> Result<PaymentAuthorization, AppError> {
        let authorization = sqlx::query_as::<_, PaymentAuthorization>(
            r#"
            UPDATE payment_authorizations
            SET status = $2, captured_amount = $3, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(captured_amount)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(authorization)
    }

    pub async fn create_payment(conn: &mut PgConnection, payment: NewPayment) -> Result<Payment, AppError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, user_id, rental_id, authorization_id, amount, currency, status,
                                  payment_type, transaction_reference, payment_date, refunded_amount,
                                  payment_processor, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, $11, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payment.user_id)
        .bind(payment.rental_id)
        .bind(payment.authorization_id)
        .bind(payment.amount)
        .bind(DEFAULT_CURRENCY)
        .bind(payment.status.as_str())
        .bind(payment.payment_type.as_str())
        .bind(payment.transaction_reference)
        .bind(now)
        .bind(INTERNAL_PROCESSOR)
        .fetch_one(conn)
        .await?;

        Ok(created)
    }

    /// Cobro completado de una reserva
    pub async fn find_rental_charge(conn: &mut PgConnection, rental_id: Uuid) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT * FROM payments
            WHERE rental_id = $1 AND payment_type = $2 AND status = $3
            ORDER BY created_at DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(rental_id)
        .bind(PaymentType::RentalCharge.as_str())
        .bind(PaymentStatus::Completed.as_str())
        .fetch_optional(conn)
        .await?;

        Ok(payment)
    }

    pub async fn record_refund(
        conn: &mut PgConnection,
        payment_id: Uuid,
        refunded_amount: Decimal,
        status: PaymentStatus,
        reason: &str,
    ) -> Result<Payment, AppError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET refunded_amount = $2, status = $3, refund_reason = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment_id)
        .bind(refunded_amount)
        .bind(status.as_str())
        .bind(reason)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(payment)
    }
}
