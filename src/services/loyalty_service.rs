//! Servicio de fidelización
//!
//! Puntos ganados por alquiler, niveles por puntos acumulados y
//! recálculo de saldos. Sin acceso a base de datos.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{LoyaltyAccount, LoyaltyTier};
use crate::utils::errors::{AppError, AppResult};

/// Umbrales de puntos acumulados por nivel
const TIER_THRESHOLDS: [(LoyaltyTier, i32); 3] = [
    (LoyaltyTier::Silver, 500),
    (LoyaltyTier::Gold, 2_000),
    (LoyaltyTier::Platinum, 5_000),
];

/// Saldos de una cuenta tras un movimiento
#[derive(Debug, Clone, PartialEq)]
pub struct LoyaltyBalances {
    pub total_points: i32,
    pub available_points: i32,
    pub redeemed_points: i32,
    pub lifetime_points: i32,
    pub tier: LoyaltyTier,
    pub points_to_next_tier: Option<i32>,
    pub tier_changed: bool,
}

/// Un punto por unidad de moneda pagada
pub fn points_for_rental(total_cost: Decimal) -> i32 {
    if total_cost <= Decimal::ZERO {
        return 0;
    }
    total_cost.floor().to_i32().unwrap_or(i32::MAX)
}

pub fn tier_for_lifetime_points(points: i32) -> LoyaltyTier {
    TIER_THRESHOLDS
        .iter()
        .rev()
        .find(|(_, threshold)| points >= *threshold)
        .map(|(tier, _)| *tier)
        .unwrap_or(LoyaltyTier::Basic)
}

/// Puntos que faltan para el siguiente nivel (`None` en PLATINUM)
pub fn points_to_next_tier(points: i32) -> Option<i32> {
    TIER_THRESHOLDS
        .iter()
        .find(|(_, threshold)| points < *threshold)
        .map(|(_, threshold)| threshold - points)
}

/// Sumar puntos ganados
pub fn apply_earning(account: &LoyaltyAccount, points: i32) -> AppResult<LoyaltyBalances> {
    let points = points.max(0);
    Ok(balances(
        account,
        add_points(account.total_points, points)?,
        add_points(account.available_points, points)?,
        add_points(account.lifetime_points, points)?,
    ))
}

/// Ajuste manual con signo; el saldo disponible no puede quedar negativo
pub fn apply_adjustment(account: &LoyaltyAccount, delta: i32) -> AppResult<LoyaltyBalances> {
    let available_points = add_points(account.available_points, delta)?;
    if available_points < 0 {
        return Err(AppError::BadRequest(format!(
            "Adjustment would leave a negative balance (available: {}, adjustment: {})",
            account.available_points, delta
        )));
    }

    Ok(balances(
        account,
        add_points(account.total_points, delta)?,
        available_points,
        add_points(account.lifetime_points, delta.max(0))?,
    ))
}

fn add_points(balance: i32, delta: i32) -> AppResult<i32> {
    balance.checked_add(delta).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Points adjustment out of range (balance: {}, adjustment: {})",
            balance, delta
        ))
    })
}

fn balances(
    account: &LoyaltyAccount,
    total_points: i32,
    available_points: i32,
    lifetime_points: i32,
) -> LoyaltyBalances {
    let tier = tier_for_lifetime_points(lifetime_points);
    LoyaltyBalances {
        total_points,
        available_points,
        redeemed_points: account.redeemed_points,
        lifetime_points,
        tier,
        points_to_next_tier: points_to_next_tier(lifetime_points),
        tier_changed: tier != account.tier(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn account(available: i32, lifetime: i32, tier: LoyaltyTier) -> LoyaltyAccount {
        LoyaltyAccount {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            total_points: available,
            available_points: available,
            redeemed_points: 0,
            lifetime_points: lifetime,
            current_tier: tier.as_str().to_string(),
            tier_start_date: None,
            points_to_next_tier: points_to_next_tier(lifetime),
            last_points_earned_date: None,
            last_points_redeemed_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_points_floor_total_cost() {
        assert_eq!(points_for_rental(Decimal::new(12999, 2)), 129);
        assert_eq!(points_for_rental(Decimal::ZERO), 0);
        assert_eq!(points_for_rental(Decimal::new(-500, 2)), 0);
    }

    #[test]
    fn test_points_saturate_on_huge_totals() {
        let huge = Decimal::from(i64::from(i32::MAX) + 10);
        assert_eq!(points_for_rental(huge), i32::MAX);
    }

    #[test]
    fn test_balance_overflow_is_rejected() {
        let acc = account(10, 10, LoyaltyTier::Basic);
        assert!(matches!(apply_adjustment(&acc, i32::MAX), Err(AppError::BadRequest(_))));

        let full = account(i32::MAX - 5, i32::MAX - 5, LoyaltyTier::Platinum);
        assert!(matches!(apply_earning(&full, 10), Err(AppError::BadRequest(_))));
        assert!(apply_earning(&full, 5).is_ok());
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(tier_for_lifetime_points(0), LoyaltyTier::Basic);
        assert_eq!(tier_for_lifetime_points(499), LoyaltyTier::Basic);
        assert_eq!(tier_for_lifetime_points(500), LoyaltyTier::Silver);
        assert_eq!(tier_for_lifetime_points(1_999), LoyaltyTier::Silver);
        assert_eq!(tier_for_lifetime_points(2_000), LoyaltyTier::Gold);
        assert_eq!(tier_for_lifetime_points(5_000), LoyaltyTier::Platinum);
        assert_eq!(tier_for_lifetime_points(90_000), LoyaltyTier::Platinum);
    }

    #[test]
    fn test_points_to_next_tier() {
        assert_eq!(points_to_next_tier(0), Some(500));
        assert_eq!(points_to_next_tier(1_200), Some(800));
        assert_eq!(points_to_next_tier(4_999), Some(1));
        assert_eq!(points_to_next_tier(5_000), None);
    }

    #[test]
    fn test_earning_promotes_tier() {
        let acc = account(450, 450, LoyaltyTier::Basic);
        let result = apply_earning(&acc, 110).unwrap();

        assert_eq!(result.available_points, 560);
        assert_eq!(result.total_points, 560);
        assert_eq!(result.lifetime_points, 560);
        assert_eq!(result.tier, LoyaltyTier::Silver);
        assert_eq!(result.points_to_next_tier, Some(1_440));
        assert!(result.tier_changed);

        let steady = apply_earning(&acc, 10).unwrap();
        assert!(!steady.tier_changed);
    }

    #[test]
    fn test_adjustment_cannot_go_negative() {
        let acc = account(100, 600, LoyaltyTier::Silver);

        let debit = apply_adjustment(&acc, -40).unwrap();
        assert_eq!(debit.available_points, 60);
        assert_eq!(debit.lifetime_points, 600);
        assert_eq!(debit.tier, LoyaltyTier::Silver);

        assert!(matches!(apply_adjustment(&acc, -101), Err(AppError::BadRequest(_))));

        let credit = apply_adjustment(&acc, 1_500).unwrap();
        assert_eq!(credit.lifetime_points, 2_100);
        assert_eq!(credit.tier, LoyaltyTier::Gold);
    }
}
