//! Controlador de pagos
//!
//! Solo registros internos: las retenciones se crean al pre-autorizar,
//! se capturan al completar la reserva y se anulan al cancelarla o
//! rechazarla. No hay llamadas a pasarelas externas.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::{ApiResponse, PaginatedResponse};
use crate::dto::payment_dto::PreAuthorizeRequest;
use crate::models::{
    Actor, AdminRole, AuthorizationStatus, Payment, PaymentAuthorization, PaymentStatus, PaymentType, Rental,
    RentalPaymentStatus, RentalStatus,
};
use crate::repositories::payment_repository::{NewAuthorization, NewPayment, PaymentRepository};
use crate::repositories::rental_repository::RentalRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{bad_request_error, not_found_error, AppError};
use crate::utils::pagination::{PageMeta, Pagination};
use crate::utils::reference::{generate_numeric_code, generate_reference};

pub struct PaymentController {
    pool: PgPool,
    repository: PaymentRepository,
    preauth_validity_days: i64,
}

impl PaymentController {
    pub fn new(pool: PgPool, preauth_validity_days: i64) -> Self {
        Self {
            repository: PaymentRepository::new(pool.clone()),
            pool,
            preauth_validity_days,
        }
    }

    /// Retener `total_cost + fianza` para una reserva del cliente
    pub async fn pre_authorize(
        &self,
        actor: &Actor,
        rental_id: Uuid,
        request: PreAuthorizeRequest,
    ) -> Result<ApiResponse<PaymentAuthorization>, AppError> {
        let user_id = actor.require_customer()?;
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let rental = RentalRepository::lock_for_update(&mut tx, rental_id)
            .await?
            .ok_or_else(|| not_found_error("Rental", &rental_id.to_string()))?;

        if rental.user_id != user_id {
            return Err(AppError::Forbidden(
                "You are not allowed to pay for this rental".to_string(),
            ));
        }

        let status = rental.status()?;
        if !matches!(status, RentalStatus::PendingApproval | RentalStatus::Approved) {
            return Err(bad_request_error(&format!(
                "Cannot pre-authorize payment for rental with status: {}",
                status
            )));
        }

        let payment_status = rental.payment_status()?;
        if payment_status != RentalPaymentStatus::Pending {
            return Err(bad_request_error(&format!(
                "Rental payment is already {}",
                payment_status
            )));
        }

        let vehicle = VehicleRepository::lock_for_update(&mut tx, rental.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &rental.vehicle_id.to_string()))?;

        let amount = (rental.total_cost + vehicle.security_deposit_amount).round_dp(2);
        let authorization = PaymentRepository::create_authorization(
            &mut tx,
            NewAuthorization {
                user_id,
                rental_id,
                amount,
                authorization_code: generate_numeric_code(6),
                authorization_reference: generate_reference("PA", 12),
                payment_method_ref: request.payment_method_ref,
                expiration_date: Utc::now() + Duration::days(self.preauth_validity_days),
            },
        )
        .await?;

        RentalRepository::set_payment_state(
            &mut tx,
            rental_id,
            RentalPaymentStatus::Authorized,
            Some(authorization.id),
            None,
        )
        .await?;

        tx.commit().await?;

        info!("💳 Pre-autorización {} de {} para reserva {}", authorization.id, amount, rental_id);

        Ok(ApiResponse::success_with_message(
            authorization,
            "Payment pre-authorized successfully",
        ))
    }

    pub async fn list_mine(
        &self,
        actor: &Actor,
        pagination: Pagination,
    ) -> Result<ApiResponse<PaginatedResponse<Payment>>, AppError> {
        let user_id = actor.require_customer()?;

        let (payments, total) = self.repository.list_for_user(user_id, pagination).await?;
        Ok(ApiResponse::success(PaginatedResponse::new(
            payments,
            PageMeta::new(total, pagination),
        )))
    }

    /// Dueño del pago, o personal de finanzas / SUPER_ADMIN
    pub async fn get_by_id(&self, actor: &Actor, id: Uuid) -> Result<ApiResponse<Payment>, AppError> {
        let payment = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Payment", &id.to_string()))?;

        let allowed = match actor {
            Actor::Customer { user_id } => *user_id == payment.user_id,
            Actor::Staff { .. } => actor.has_role(&[AdminRole::SuperAdmin, AdminRole::FinanceAdmin]),
        };
        if !allowed {
            return Err(AppError::Forbidden(
                "You are not allowed to view this payment".to_string(),
            ));
        }

        Ok(ApiResponse::success(payment))
    }

    /// Anular la retención activa de la reserva, si la hay
    pub async fn void_hold(conn: &mut PgConnection, rental: &Rental) -> Result<bool, AppError> {
        let Some(authorization) = Self::active_hold(conn, rental).await? else {
            return Ok(false);
        };

        PaymentRepository::settle_authorization(conn, authorization.id, AuthorizationStatus::Voided, Decimal::ZERO)
            .await?;
        RentalRepository::set_payment_state(conn, rental.id, RentalPaymentStatus::Pending, None, None).await?;

        info!("💳 Retención {} anulada (reserva {})", authorization.id, rental.id);
        Ok(true)
    }

    /// Capturar la retención activa por el total final y registrar el cobro
    pub async fn capture_hold(
        conn: &mut PgConnection,
        rental: &Rental,
        amount: Decimal,
    ) -> Result<Option<Payment>, AppError> {
        let Some(authorization) = Self::active_hold(conn, rental).await? else {
            return Ok(None);
        };

        if let Some(excess) = excess_over_hold(amount, authorization.amount) {
            warn!(
                "⚠️ Cobro de {} supera la retención {} de {} (reserva {}, exceso {})",
                amount, authorization.id, authorization.amount, rental.id, excess
            );
        }

        PaymentRepository::settle_authorization(conn, authorization.id, AuthorizationStatus::Captured, amount).await?;

        let payment = PaymentRepository::create_payment(
            conn,
            NewPayment {
                user_id: rental.user_id,
                rental_id: Some(rental.id),
                authorization_id: Some(authorization.id),
                amount,
                status: PaymentStatus::Completed,
                payment_type: PaymentType::RentalCharge,
                transaction_reference: generate_reference("TXN", 12),
            },
        )
        .await?;

        RentalRepository::set_payment_state(conn, rental.id, RentalPaymentStatus::Paid, None, Some(payment.id))
            .await?;

        info!("💳 Cobro {} de {} (reserva {})", payment.id, amount, rental.id);
        Ok(Some(payment))
    }

    /// Registrar el reembolso sobre el cobro de la reserva
    pub async fn refund_charge(
        conn: &mut PgConnection,
        rental: &Rental,
        amount: Decimal,
        reason: &str,
    ) -> Result<(), AppError> {
        if amount <= Decimal::ZERO {
            return Ok(());
        }

        if let Some(payment) = PaymentRepository::find_rental_charge(conn, rental.id).await? {
            let refunded = amount.min(payment.amount);
            let status = if refunded >= payment.amount {
                PaymentStatus::Refunded
            } else {
                PaymentStatus::PartiallyRefunded
            };
            PaymentRepository::record_refund(conn, payment.id, refunded, status, reason).await?;
        }

        RentalRepository::set_payment_state(conn, rental.id, RentalPaymentStatus::Refunded, None, None).await?;
        Ok(())
    }

    async fn active_hold(
        conn: &mut PgConnection,
        rental: &Rental,
    ) -> Result<Option<PaymentAuthorization>, AppError> {
        if rental.payment_status()? != RentalPaymentStatus::Authorized {
            return Ok(None);
        }

        let Some(authorization_id) = rental.pre_authorization_id else {
            return Ok(None);
        };

        let authorization = PaymentRepository::find_authorization(conn, authorization_id).await?;
        Ok(authorization.filter(|a| a.is_active_hold()))
    }
}

/// Parte del cobro que no cubre la retención
fn excess_over_hold(amount: Decimal, authorized: Decimal) -> Option<Decimal> {
    (amount > authorized).then(|| amount - authorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excess_over_hold() {
        let hold = Decimal::new(3000, 0);
        assert_eq!(excess_over_hold(Decimal::new(2500, 0), hold), None);
        assert_eq!(excess_over_hold(hold, hold), None);
        assert_eq!(excess_over_hold(Decimal::new(34505, 1), hold), Some(Decimal::new(4505, 1)));
    }
}
