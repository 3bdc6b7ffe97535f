//! Controlador de reservas
//!
//! Orquesta el ciclo de vida de una reserva. Cada operación que cambia
//! estado corre en una transacción: la fila de la reserva (y la del
//! vehículo cuando aplica) se bloquea con `SELECT ... FOR UPDATE`, de modo
//! que dos reservas concurrentes del mismo vehículo se serializan.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::config::EnvironmentConfig;
use crate::controllers::payment_controller::PaymentController;
use crate::dto::common_dto::{ApiResponse, PaginatedResponse};
use crate::dto::rental_dto::{
    CancelRentalRequest, CancelRentalResponse, CompleteRentalRequest, CreateRentalRequest, DeclineRentalRequest,
    PastRentalsQuery, QuoteResponse, RentalCompletionResponse, RentalDetailResponse, StartRentalRequest,
};
use crate::models::{
    Actor, AdminRole, KycStatus, LoyaltyTier, LoyaltyTransactionType, Rental, RentalPaymentStatus, RentalStatus, Vehicle,
    VehicleStatus,
};
use crate::repositories::loyalty_repository::{LoyaltyRepository, NewLoyaltyTransaction};
use crate::repositories::rental_repository::{
    CompletionRecord, NewRental, RentalListQuery, RentalRepository, RentalSortField, SortDirection, StartRecord,
};
use crate::repositories::station_repository::StationRepository;
use crate::repositories::user_repository::UserRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::loyalty_service;
use crate::services::pricing_service::{CostBreakdown, PricingPolicy, Refund, RefundStatus};
use crate::services::rental_lifecycle::{self, RentalAction};
use crate::utils::errors::{bad_request_error, not_found_error, AppError};
use crate::utils::pagination::{PageMeta, Pagination};

const DEFAULT_DECLINE_REASON: &str = "Declined by admin";

pub struct RentalController {
    pool: PgPool,
    rentals: RentalRepository,
    vehicles: VehicleRepository,
    stations: StationRepository,
    users: UserRepository,
    pricing: PricingPolicy,
    require_kyc: bool,
}

impl RentalController {
    pub fn new(pool: PgPool, config: &EnvironmentConfig) -> Self {
        Self {
            rentals: RentalRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool.clone()),
            stations: StationRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
            pricing: config.pricing.clone(),
            require_kyc: config.require_kyc_for_rental,
        }
    }

    /// Reservar un vehículo (solo clientes); queda en PENDING_APPROVAL
    pub async fn create(&self, actor: &Actor, request: CreateRentalRequest) -> Result<ApiResponse<Rental>, AppError> {
        let user_id = actor.require_customer()?;
        request.validate()?;
        rental_lifecycle::validate_booking_window(request.start_date, request.end_date, Utc::now())?;

        let mut tx = self.pool.begin().await?;

        let (_, breakdown) = self.check_booking(&mut tx, user_id, &request).await?;

        let rental = RentalRepository::insert(
            &mut tx,
            NewRental {
                user_id,
                vehicle_id: request.vehicle_id,
                pickup_station_id: request.pickup_station_id,
                return_station_id: request.return_station_id,
                start_date: request.start_date,
                end_date: request.end_date,
                breakdown,
                discount_code: request
                    .discount_code
                    .map(|code| code.trim().to_string())
                    .filter(|code| !code.is_empty()),
                notes: request.notes,
            },
        )
        .await?;

        tx.commit().await?;

        info!("📅 Reserva {} creada → {}", rental.id, RentalStatus::PendingApproval);

        Ok(ApiResponse::success_with_message(rental, "Rental created successfully"))
    }

    /// Mismas comprobaciones y precio que `create`, sin guardar nada
    pub async fn quote(&self, actor: &Actor, request: CreateRentalRequest) -> Result<ApiResponse<QuoteResponse>, AppError> {
        let user_id = actor.require_customer()?;
        request.validate()?;
        rental_lifecycle::validate_booking_window(request.start_date, request.end_date, Utc::now())?;

        let mut tx = self.pool.begin().await?;
        let (vehicle, breakdown) = self.check_booking(&mut tx, user_id, &request).await?;
        tx.rollback().await?;

        Ok(ApiResponse::success(QuoteResponse {
            vehicle_id: vehicle.id,
            start_date: request.start_date,
            end_date: request.end_date,
            duration_hours: (request.end_date - request.start_date).num_hours(),
            breakdown,
            security_deposit_amount: vehicle.security_deposit_amount,
        }))
    }

    pub async fn get_by_id(&self, actor: &Actor, id: Uuid) -> Result<ApiResponse<RentalDetailResponse>, AppError> {
        let rental = self
            .rentals
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Rental", &id.to_string()))?;

        rental_lifecycle::ensure_can_access(actor, &rental)?;

        let vehicle = self.vehicles.find_by_id(rental.vehicle_id).await?;
        let pickup_station = self.stations.find_by_id(rental.pickup_station_id).await?;
        let return_station = if rental.return_station_id == rental.pickup_station_id {
            pickup_station.clone()
        } else {
            self.stations.find_by_id(rental.return_station_id).await?
        };

        Ok(ApiResponse::success(RentalDetailResponse {
            rental,
            vehicle,
            pickup_station,
            return_station,
        }))
    }

    /// Cancelar: reembolso según antelación si ya estaba pagada, o
    /// anulación de la retención si solo estaba autorizada
    pub async fn cancel(
        &self,
        actor: &Actor,
        id: Uuid,
        request: CancelRentalRequest,
    ) -> Result<ApiResponse<CancelRentalResponse>, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;
        let rental = lock_rental(&mut tx, id).await?;

        rental_lifecycle::ensure_can_access(actor, &rental)?;
        let next = rental_lifecycle::next_status(rental.status()?, RentalAction::Cancel)?;

        let refund = match cancellation_settlement(rental.payment_status()?) {
            CancellationSettlement::Refund => {
                let refund = self
                    .pricing
                    .refund_for_cancellation(rental.total_cost, rental.start_date, Utc::now());
                PaymentController::refund_charge(&mut tx, &rental, refund.amount, "Rental cancelled").await?;
                refund
            }
            CancellationSettlement::VoidHold => {
                PaymentController::void_hold(&mut tx, &rental).await?;
                no_refund()
            }
            CancellationSettlement::Nothing => no_refund(),
        };

        let reason = request
            .cancellation_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        let cancelled = RentalRepository::record_cancellation(&mut tx, id, reason).await?;

        tx.commit().await?;

        info!("📅 Reserva {} → {} (reembolso {})", id, next, refund.amount);

        Ok(ApiResponse::success_with_message(
            CancelRentalResponse {
                rental_id: cancelled.id,
                status: cancelled.status,
                refund_amount: refund.amount,
                refund_status: refund.status.as_str().to_string(),
            },
            "Rental cancelled successfully",
        ))
    }

    pub async fn approve(&self, actor: &Actor, id: Uuid) -> Result<ApiResponse<Rental>, AppError> {
        let mut tx = self.pool.begin().await?;
        let rental = lock_rental(&mut tx, id).await?;

        let admin_id = rental_lifecycle::ensure_can_review(actor, &rental)?;
        let next = rental_lifecycle::next_status(rental.status()?, RentalAction::Approve)?;

        let approved = RentalRepository::record_review(&mut tx, id, next, admin_id, None).await?;
        tx.commit().await?;

        info!("📅 Reserva {} → {} por admin {}", id, next, admin_id);

        Ok(ApiResponse::success_with_message(approved, "Rental approved successfully"))
    }

    pub async fn decline(
        &self,
        actor: &Actor,
        id: Uuid,
        request: DeclineRentalRequest,
    ) -> Result<ApiResponse<Rental>, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;
        let rental = lock_rental(&mut tx, id).await?;

        let admin_id = rental_lifecycle::ensure_can_review(actor, &rental)?;
        let next = rental_lifecycle::next_status(rental.status()?, RentalAction::Decline)?;

        PaymentController::void_hold(&mut tx, &rental).await?;

        let reason = request
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_DECLINE_REASON);
        let declined = RentalRepository::record_review(&mut tx, id, next, admin_id, Some(reason)).await?;

        tx.commit().await?;

        info!("📅 Reserva {} → {} por admin {}", id, next, admin_id);

        Ok(ApiResponse::success_with_message(declined, "Rental declined"))
    }

    /// Entregar el vehículo: APPROVED → ACTIVE y vehículo → RENTED
    pub async fn start(&self, actor: &Actor, id: Uuid, request: StartRentalRequest) -> Result<ApiResponse<Rental>, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;
        let rental = lock_rental(&mut tx, id).await?;

        rental_lifecycle::ensure_can_access(actor, &rental)?;
        let next = rental_lifecycle::next_status(rental.status()?, RentalAction::Start)?;

        let vehicle = lock_vehicle(&mut tx, rental.vehicle_id).await?;
        ensure_vehicle_available(&vehicle)?;

        let started = RentalRepository::record_start(
            &mut tx,
            id,
            StartRecord {
                actual_start_date: Utc::now(),
                initial_charge_level: request.initial_charge_level,
                initial_odometer: request.initial_odometer,
                pre_rental_inspection: request.pre_rental_inspection,
            },
        )
        .await?;
        VehicleRepository::set_status(&mut tx, vehicle.id, VehicleStatus::Rented).await?;

        tx.commit().await?;

        info!("📅 Reserva {} → {}", id, next);

        Ok(ApiResponse::success_with_message(started, "Rental started successfully"))
    }

    /// Devolver el vehículo
    ///
    /// En una sola transacción: cargos adicionales, total final, devolución
    /// del vehículo a la estación de destino, captura de la retención y
    /// abono de puntos de fidelización.
    pub async fn complete(
        &self,
        actor: &Actor,
        id: Uuid,
        request: CompleteRentalRequest,
    ) -> Result<ApiResponse<RentalCompletionResponse>, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;
        let rental = lock_rental(&mut tx, id).await?;

        rental_lifecycle::ensure_can_access(actor, &rental)?;
        let next = rental_lifecycle::next_status(rental.status()?, RentalAction::Complete)?;

        let returned_at = Utc::now();
        let vehicle = lock_vehicle(&mut tx, rental.vehicle_id).await?;

        let distance_traveled = odometer_distance(rental.initial_odometer, request.final_odometer)?;

        let additional_charges: Vec<_> = [
            self.pricing
                .late_return_fee(vehicle.hourly_rate, rental.end_date, returned_at),
            self.pricing
                .recharge_fee(rental.initial_charge_level, request.final_charge_level),
        ]
        .into_iter()
        .flatten()
        .collect();

        let total_cost = self.pricing.final_total(&rental.cost_breakdown(), &additional_charges);
        let points = loyalty_service::points_for_rental(total_cost);

        let return_station = StationRepository::find_by_id_in(&mut tx, rental.return_station_id)
            .await?
            .ok_or_else(|| not_found_error("Station", &rental.return_station_id.to_string()))?;

        RentalRepository::record_completion(
            &mut tx,
            id,
            CompletionRecord {
                actual_end_date: returned_at,
                final_charge_level: request.final_charge_level,
                final_odometer: request.final_odometer,
                post_rental_inspection: request.post_rental_inspection,
                additional_charges: additional_charges.clone(),
                total_cost,
                loyalty_points_earned: points,
            },
        )
        .await?;

        VehicleRepository::record_return(
            &mut tx,
            vehicle.id,
            return_station.id,
            (return_station.latitude, return_station.longitude),
            distance_traveled.unwrap_or(0.0),
        )
        .await?;

        PaymentController::capture_hold(&mut tx, &rental, total_cost).await?;

        let loyalty_tier = credit_points(&mut tx, &rental, points).await?;

        let completed = lock_rental(&mut tx, id).await?;
        tx.commit().await?;

        info!(
            "📅 Reserva {} → {} (total {}, {} puntos)",
            id, next, total_cost, points
        );

        Ok(ApiResponse::success_with_message(
            RentalCompletionResponse {
                rental: completed,
                additional_charges,
                distance_traveled,
                loyalty_points_earned: points,
                loyalty_tier,
            },
            "Rental completed successfully",
        ))
    }

    /// Reservas en curso del cliente
    pub async fn list_active(
        &self,
        actor: &Actor,
        pagination: Pagination,
    ) -> Result<ApiResponse<PaginatedResponse<Rental>>, AppError> {
        let user_id = actor.require_customer()?;
        self.page(
            RentalListQuery {
                user_id: Some(user_id),
                statuses: &[RentalStatus::Active],
                station_id: None,
                starting_after: None,
                sort: RentalSortField::StartDate,
                direction: SortDirection::Desc,
            },
            pagination,
        )
        .await
    }

    /// Reservas aprobadas que aún no han empezado
    pub async fn list_upcoming(
        &self,
        actor: &Actor,
        pagination: Pagination,
    ) -> Result<ApiResponse<PaginatedResponse<Rental>>, AppError> {
        let user_id = actor.require_customer()?;
        self.page(
            RentalListQuery {
                user_id: Some(user_id),
                statuses: &[RentalStatus::Approved],
                station_id: None,
                starting_after: Some(Utc::now()),
                sort: RentalSortField::StartDate,
                direction: SortDirection::Asc,
            },
            pagination,
        )
        .await
    }

    /// Historial: completadas o canceladas
    pub async fn list_past(
        &self,
        actor: &Actor,
        query: PastRentalsQuery,
    ) -> Result<ApiResponse<PaginatedResponse<Rental>>, AppError> {
        let user_id = actor.require_customer()?;
        self.page(
            RentalListQuery {
                user_id: Some(user_id),
                statuses: &[RentalStatus::Completed, RentalStatus::Cancelled],
                station_id: None,
                starting_after: None,
                sort: RentalSortField::parse_or_default(query.sort.as_deref()),
                direction: SortDirection::parse_or_desc(query.order.as_deref()),
            },
            query.pagination().into(),
        )
        .await
    }

    /// Reservas pendientes de aprobación, las más antiguas primero
    pub async fn list_pending(
        &self,
        actor: &Actor,
        pagination: Pagination,
    ) -> Result<ApiResponse<PaginatedResponse<Rental>>, AppError> {
        actor.require_staff()?;

        let station_id = match actor {
            Actor::Staff {
                role: AdminRole::StationMaster,
                station_id,
                ..
            } => Some(station_id.ok_or_else(|| {
                AppError::Forbidden("Station master is not assigned to a station".to_string())
            })?),
            _ => None,
        };

        self.page(
            RentalListQuery {
                user_id: None,
                statuses: &[RentalStatus::PendingApproval],
                station_id,
                starting_after: None,
                sort: RentalSortField::BookingDate,
                direction: SortDirection::Asc,
            },
            pagination,
        )
        .await
    }

    async fn page(
        &self,
        query: RentalListQuery<'_>,
        pagination: Pagination,
    ) -> Result<ApiResponse<PaginatedResponse<Rental>>, AppError> {
        let (rentals, total) = self.rentals.list(&query, pagination).await?;
        Ok(ApiResponse::success(PaginatedResponse::new(
            rentals,
            PageMeta::new(total, pagination),
        )))
    }

    /// Comprobaciones de reserva con el vehículo bloqueado, y su precio
    async fn check_booking(
        &self,
        conn: &mut PgConnection,
        user_id: Uuid,
        request: &CreateRentalRequest,
    ) -> Result<(Vehicle, CostBreakdown), AppError> {
        let vehicle = lock_vehicle(conn, request.vehicle_id).await?;
        ensure_vehicle_available(&vehicle)?;

        if RentalRepository::has_overlap(conn, vehicle.id, request.start_date, request.end_date).await? {
            return Err(AppError::Conflict(
                "Vehicle is already booked for part or all of the requested time period".to_string(),
            ));
        }

        for station_id in [request.pickup_station_id, request.return_station_id] {
            let station = StationRepository::find_by_id_in(conn, station_id)
                .await?
                .ok_or_else(|| not_found_error("Station", &station_id.to_string()))?;
            if !station.is_active {
                return Err(bad_request_error(&format!("Station {} is not active", station.name)));
            }
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| not_found_error("User", &user_id.to_string()))?;

        if self.require_kyc && user.kyc_status() != KycStatus::Verified {
            return Err(AppError::Forbidden(
                "KYC verification is required before renting a vehicle".to_string(),
            ));
        }

        let tier = LoyaltyRepository::find_tier(conn, user_id).await?;
        rental_lifecycle::ensure_tier_allows(tier, vehicle.min_loyalty_tier())?;

        let breakdown = self.pricing.quote(
            &vehicle.rates(),
            request.start_date,
            request.end_date,
            request.discount_code.as_deref(),
        );

        Ok((vehicle, breakdown))
    }
}

async fn lock_rental(conn: &mut PgConnection, id: Uuid) -> Result<Rental, AppError> {
    RentalRepository::lock_for_update(conn, id)
        .await?
        .ok_or_else(|| not_found_error("Rental", &id.to_string()))
}

async fn lock_vehicle(conn: &mut PgConnection, id: Uuid) -> Result<Vehicle, AppError> {
    VehicleRepository::lock_for_update(conn, id)
        .await?
        .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))
}

fn ensure_vehicle_available(vehicle: &Vehicle) -> Result<(), AppError> {
    let status = vehicle.status()?;
    if status != VehicleStatus::Available {
        return Err(bad_request_error(&format!(
            "Vehicle is not available (current status: {})",
            status
        )));
    }
    Ok(())
}

/// Movimiento de dinero al cancelar según el estado de pago
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CancellationSettlement {
    Refund,
    VoidHold,
    Nothing,
}

fn cancellation_settlement(payment_status: RentalPaymentStatus) -> CancellationSettlement {
    match payment_status {
        RentalPaymentStatus::Paid => CancellationSettlement::Refund,
        RentalPaymentStatus::Authorized => CancellationSettlement::VoidHold,
        _ => CancellationSettlement::Nothing,
    }
}

/// Distancia recorrida; sin ambas lecturas no hay distancia
fn odometer_distance(initial: Option<f64>, final_reading: Option<f64>) -> Result<Option<f64>, AppError> {
    match (initial, final_reading) {
        (Some(initial), Some(final_reading)) if final_reading < initial => Err(bad_request_error(
            "Final odometer reading cannot be lower than the initial reading",
        )),
        (Some(initial), Some(final_reading)) => Ok(Some(final_reading - initial)),
        _ => Ok(None),
    }
}

fn no_refund() -> Refund {
    Refund {
        amount: Decimal::ZERO,
        status: RefundStatus::None,
    }
}

/// Abonar los puntos de la reserva y devolver el nivel resultante
async fn credit_points(
    conn: &mut PgConnection,
    rental: &Rental,
    points: i32,
) -> Result<LoyaltyTier, AppError> {
    let account = LoyaltyRepository::lock_or_create(conn, rental.user_id).await?;
    if points <= 0 {
        return Ok(account.tier());
    }

    let balances = loyalty_service::apply_earning(&account, points)?;
    LoyaltyRepository::update_balances(conn, account.id, &balances, true).await?;
    LoyaltyRepository::insert_transaction(
        conn,
        NewLoyaltyTransaction {
            user_id: rental.user_id,
            loyalty_id: account.id,
            transaction_type: LoyaltyTransactionType::Earned,
            points,
            balance_before: account.available_points,
            balance_after: balances.available_points,
            description: Some(format!("Points earned for rental {}", rental.id)),
            source: Some("RENTAL".to_string()),
            source_id: Some(rental.id),
            created_by: None,
        },
    )
    .await?;

    if balances.tier_changed {
        info!("⭐ Usuario {} sube a nivel {}", rental.user_id, balances.tier);
    }

    Ok(balances.tier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn vehicle_with_status(status: VehicleStatus) -> Vehicle {
        let now: DateTime<Utc> = Utc::now();
        Vehicle {
            id: Uuid::new_v4(),
            model: "Nexon EV".to_string(),
            vin_number: "1HGCM82633A004352".to_string(),
            vehicle_type: "CAR".to_string(),
            battery_capacity: Some(40.5),
            range_km: Some(312),
            status: status.as_str().to_string(),
            latitude: None,
            longitude: None,
            station_id: None,
            hourly_rate: Decimal::new(150, 0),
            daily_rate: Decimal::new(2500, 0),
            weekly_rate: None,
            security_deposit_amount: Decimal::new(5000, 0),
            image_urls: serde_json::json!([]),
            total_rentals: 0,
            total_distance: 0.0,
            min_loyalty_tier: "BASIC".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_only_available_vehicles_can_be_booked() {
        assert!(ensure_vehicle_available(&vehicle_with_status(VehicleStatus::Available)).is_ok());

        match ensure_vehicle_available(&vehicle_with_status(VehicleStatus::Maintenance)) {
            Err(AppError::BadRequest(msg)) => {
                assert_eq!(msg, "Vehicle is not available (current status: MAINTENANCE)")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_no_refund_is_zero() {
        let refund = no_refund();
        assert_eq!(refund.amount, Decimal::ZERO);
        assert_eq!(refund.status, RefundStatus::None);
    }

    #[test]
    fn test_cancellation_settles_by_payment_status() {
        assert_eq!(cancellation_settlement(RentalPaymentStatus::Paid), CancellationSettlement::Refund);
        assert_eq!(cancellation_settlement(RentalPaymentStatus::Authorized), CancellationSettlement::VoidHold);
        assert_eq!(cancellation_settlement(RentalPaymentStatus::Pending), CancellationSettlement::Nothing);
        assert_eq!(cancellation_settlement(RentalPaymentStatus::Refunded), CancellationSettlement::Nothing);
        assert_eq!(cancellation_settlement(RentalPaymentStatus::Failed), CancellationSettlement::Nothing);
    }

    #[test]
    fn test_distance_from_odometer_readings() {
        assert_eq!(odometer_distance(Some(1200.0), Some(1325.5)).unwrap(), Some(125.5));
        assert_eq!(odometer_distance(Some(1200.0), Some(1200.0)).unwrap(), Some(0.0));
        assert_eq!(odometer_distance(None, Some(1325.5)).unwrap(), None);
        assert_eq!(odometer_distance(Some(1200.0), None).unwrap(), None);

        match odometer_distance(Some(1200.0), Some(1199.0)) {
            Err(AppError::BadRequest(msg)) => {
                assert_eq!(msg, "Final odometer reading cannot be lower than the initial reading")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
