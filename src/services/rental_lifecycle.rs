//! Ciclo de vida de una reserva
//!
//! Máquina de estados de `Rental.status`, detección de solapamiento entre
//! ventanas de reserva y reglas de acceso por principal:
//!
//! ```text
//! PENDING_APPROVAL ──approve──▶ APPROVED ──start──▶ ACTIVE ──complete──▶ COMPLETED
//!        │  └──decline──▶ DECLINED   │
//!        └──────cancel──────┴──────▶ CANCELLED
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Actor, AdminRole, LoyaltyTier, Rental, RentalStatus};
use crate::utils::errors::{AppError, AppResult};

/// Acciones que mueven una reserva entre estados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentalAction {
    Approve,
    Decline,
    Cancel,
    Start,
    Complete,
}

impl RentalAction {
    pub fn verb(&self) -> &'static str {
        match self {
            RentalAction::Approve => "approve",
            RentalAction::Decline => "decline",
            RentalAction::Cancel => "cancel",
            RentalAction::Start => "start",
            RentalAction::Complete => "complete",
        }
    }
}

impl fmt::Display for RentalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Transición no permitida desde el estado actual
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Cannot {action} rental with status: {from}")]
pub struct TransitionError {
    pub from: RentalStatus,
    pub action: RentalAction,
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Estado resultante de aplicar `action` sobre `current`
pub fn next_status(current: RentalStatus, action: RentalAction) -> Result<RentalStatus, TransitionError> {
    use RentalAction::*;
    use RentalStatus::*;

    match (current, action) {
        (PendingApproval, Approve) => Ok(Approved),
        (PendingApproval, Decline) => Ok(Declined),
        (PendingApproval | Approved, Cancel) => Ok(Cancelled),
        (Approved, Start) => Ok(Active),
        (Active, Complete) => Ok(Completed),
        (from, action) => Err(TransitionError { from, action }),
    }
}

/// Solapamiento de intervalos cerrados: extremos que se tocan también chocan
pub fn windows_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Validar la ventana solicitada para una reserva nueva
pub fn validate_booking_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if start < now {
        return Err(AppError::BadRequest("Start date must be in the future".to_string()));
    }
    if end <= start {
        return Err(AppError::BadRequest("End date must be after start date".to_string()));
    }
    Ok(())
}

/// Staff de cualquier rol o el cliente dueño de la reserva
pub fn ensure_can_access(actor: &Actor, rental: &Rental) -> AppResult<()> {
    match actor {
        Actor::Staff { .. } => Ok(()),
        Actor::Customer { user_id } if *user_id == rental.user_id => Ok(()),
        Actor::Customer { .. } => Err(AppError::Forbidden(
            "You are not allowed to access this rental".to_string(),
        )),
    }
}

/// Solo staff; un jefe de estación únicamente revisa reservas de su estación.
/// Devuelve el id del admin que revisa.
pub fn ensure_can_review(actor: &Actor, rental: &Rental) -> AppResult<Uuid> {
    match actor {
        Actor::Customer { .. } => Err(AppError::Forbidden(
            "Only staff can review rentals".to_string(),
        )),
        Actor::Staff {
            admin_id,
            role: AdminRole::StationMaster,
            station_id,
        } => match station_id {
            Some(station) if rental.touches_station(*station) => Ok(*admin_id),
            _ => Err(AppError::Forbidden(
                "Station masters can only review rentals for their own station".to_string(),
            )),
        },
        Actor::Staff { admin_id, .. } => Ok(*admin_id),
    }
}

/// Nivel de fidelización mínimo exigido por el vehículo
pub fn ensure_tier_allows(user_tier: LoyaltyTier, vehicle_min_tier: LoyaltyTier) -> AppResult<()> {
    if user_tier < vehicle_min_tier {
        return Err(AppError::Forbidden(format!(
            "This vehicle requires a minimum loyalty tier of {}. Your current tier is {}.",
            vehicle_min_tier, user_tier
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    fn at(hours: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    }

    fn rental(user_id: Uuid, pickup: Uuid, dropoff: Uuid) -> Rental {
        Rental {
            id: Uuid::new_v4(),
            user_id,
            vehicle_id: Uuid::new_v4(),
            pickup_station_id: pickup,
            return_station_id: dropoff,
            booking_date: at(0),
            start_date: at(24),
            end_date: at(48),
            actual_start_date: None,
            actual_end_date: None,
            status: RentalStatus::PendingApproval.as_str().to_string(),
            approved_by: None,
            approval_date: None,
            cancellation_reason: None,
            initial_charge_level: None,
            final_charge_level: None,
            initial_odometer: None,
            final_odometer: None,
            pre_rental_inspection: None,
            post_rental_inspection: None,
            rental_cost: Decimal::from(100),
            discount: Decimal::ZERO,
            discount_code: None,
            tax_amount: Decimal::from(10),
            additional_charges: serde_json::json!([]),
            total_cost: Decimal::from(110),
            payment_status: "PENDING".to_string(),
            payment_id: None,
            pre_authorization_id: None,
            loyalty_points_earned: 0,
            notes: None,
            created_at: at(0),
            updated_at: at(0),
        }
    }

    #[test]
    fn test_happy_path_transitions() {
        let approved = next_status(RentalStatus::PendingApproval, RentalAction::Approve).unwrap();
        assert_eq!(approved, RentalStatus::Approved);
        let active = next_status(approved, RentalAction::Start).unwrap();
        assert_eq!(active, RentalStatus::Active);
        assert_eq!(
            next_status(active, RentalAction::Complete).unwrap(),
            RentalStatus::Completed
        );
    }

    #[test]
    fn test_cancel_and_decline_sources() {
        assert_eq!(
            next_status(RentalStatus::PendingApproval, RentalAction::Cancel).unwrap(),
            RentalStatus::Cancelled
        );
        assert_eq!(
            next_status(RentalStatus::Approved, RentalAction::Cancel).unwrap(),
            RentalStatus::Cancelled
        );
        assert_eq!(
            next_status(RentalStatus::PendingApproval, RentalAction::Decline).unwrap(),
            RentalStatus::Declined
        );
        assert!(next_status(RentalStatus::Approved, RentalAction::Decline).is_err());
        assert!(next_status(RentalStatus::Active, RentalAction::Cancel).is_err());
    }

    #[test]
    fn test_terminal_states_reject_every_action() {
        let actions = [
            RentalAction::Approve,
            RentalAction::Decline,
            RentalAction::Cancel,
            RentalAction::Start,
            RentalAction::Complete,
        ];

        for status in RentalStatus::ALL.iter().filter(|s| s.is_terminal()) {
            assert!(!status.is_blocking());
            for action in actions {
                assert!(next_status(*status, action).is_err());
            }
        }
    }

    #[test]
    fn test_transition_error_message() {
        let err = next_status(RentalStatus::Completed, RentalAction::Cancel).unwrap_err();
        assert_eq!(err.to_string(), "Cannot cancel rental with status: COMPLETED");

        match AppError::from(err) {
            AppError::BadRequest(msg) => assert!(msg.starts_with("Cannot cancel")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_blocking_statuses() {
        assert!(RentalStatus::PendingApproval.is_blocking());
        assert!(RentalStatus::Approved.is_blocking());
        assert!(RentalStatus::Active.is_blocking());
        assert!(!RentalStatus::Completed.is_blocking());
    }

    #[test]
    fn test_windows_overlap_closed_intervals() {
        assert!(windows_overlap(at(0), at(10), at(5), at(15)));
        assert!(windows_overlap(at(5), at(15), at(0), at(10)));
        assert!(windows_overlap(at(0), at(20), at(5), at(10)));
        // extremos que se tocan
        assert!(windows_overlap(at(0), at(10), at(10), at(20)));
        assert!(!windows_overlap(at(0), at(10), at(11), at(20)));
        assert!(!windows_overlap(at(11), at(20), at(0), at(10)));
    }

    #[test]
    fn test_validate_booking_window() {
        let now = at(0);
        assert!(validate_booking_window(at(1), at(2), now).is_ok());
        assert!(validate_booking_window(now, at(2), now).is_ok());

        match validate_booking_window(at(-1), at(2), now) {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Start date must be in the future"),
            other => panic!("unexpected result: {:?}", other),
        }
        match validate_booking_window(at(2), at(2), now) {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "End date must be after start date"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_access_for_owner_and_staff() {
        let owner = Uuid::new_v4();
        let r = rental(owner, Uuid::new_v4(), Uuid::new_v4());

        assert!(ensure_can_access(&Actor::Customer { user_id: owner }, &r).is_ok());
        assert!(ensure_can_access(&Actor::Customer { user_id: Uuid::new_v4() }, &r).is_err());

        let support = Actor::Staff {
            admin_id: Uuid::new_v4(),
            role: AdminRole::SupportStaff,
            station_id: None,
        };
        assert!(ensure_can_access(&support, &r).is_ok());
    }

    #[test]
    fn test_review_scoping_for_station_masters() {
        let pickup = Uuid::new_v4();
        let dropoff = Uuid::new_v4();
        let r = rental(Uuid::new_v4(), pickup, dropoff);

        let own_pickup = Actor::Staff {
            admin_id: Uuid::new_v4(),
            role: AdminRole::StationMaster,
            station_id: Some(pickup),
        };
        let own_return = Actor::Staff {
            admin_id: Uuid::new_v4(),
            role: AdminRole::StationMaster,
            station_id: Some(dropoff),
        };
        let other_station = Actor::Staff {
            admin_id: Uuid::new_v4(),
            role: AdminRole::StationMaster,
            station_id: Some(Uuid::new_v4()),
        };
        let no_station = Actor::Staff {
            admin_id: Uuid::new_v4(),
            role: AdminRole::StationMaster,
            station_id: None,
        };
        let super_admin = Actor::Staff {
            admin_id: Uuid::new_v4(),
            role: AdminRole::SuperAdmin,
            station_id: None,
        };

        assert_eq!(ensure_can_review(&own_pickup, &r).unwrap(), own_pickup.id());
        assert!(ensure_can_review(&own_return, &r).is_ok());
        assert!(ensure_can_review(&other_station, &r).is_err());
        assert!(ensure_can_review(&no_station, &r).is_err());
        assert!(ensure_can_review(&super_admin, &r).is_ok());
        assert!(ensure_can_review(&Actor::Customer { user_id: r.user_id }, &r).is_err());
    }

    #[test]
    fn test_tier_gate() {
        assert!(ensure_tier_allows(LoyaltyTier::Gold, LoyaltyTier::Silver).is_ok());
        assert!(ensure_tier_allows(LoyaltyTier::Basic, LoyaltyTier::Basic).is_ok());

        match ensure_tier_allows(LoyaltyTier::Silver, LoyaltyTier::Platinum) {
            Err(AppError::Forbidden(msg)) => assert_eq!(
                msg,
                "This vehicle requires a minimum loyalty tier of PLATINUM. Your current tier is SILVER."
            ),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
