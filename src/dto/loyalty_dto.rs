use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{LoyaltyAccount, LoyaltyTier, LoyaltyTransaction};
use crate::utils::errors::{bad_request_error, AppResult};

/// Límite de un ajuste manual, en valor absoluto
pub const MAX_ADJUSTMENT_POINTS: i32 = 1_000_000;

#[derive(Debug, Deserialize, Validate)]
pub struct AdjustPointsRequest {
    pub user_id: Uuid,
    pub points: i32,

    #[validate(length(min = 1, max = 255))]
    pub description: String,
}

impl AdjustPointsRequest {
    /// Ajuste distinto de cero y dentro de ±`MAX_ADJUSTMENT_POINTS`
    pub fn ensure_points_in_range(&self) -> AppResult<()> {
        if self.points == 0 {
            return Err(bad_request_error("Adjustment points must not be zero"));
        }
        if self.points.unsigned_abs() > MAX_ADJUSTMENT_POINTS.unsigned_abs() {
            return Err(bad_request_error(&format!(
                "Adjustment points must be between -{} and {}",
                MAX_ADJUSTMENT_POINTS, MAX_ADJUSTMENT_POINTS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct LoyaltySummaryResponse {
    #[serde(flatten)]
    pub account: LoyaltyAccount,
    pub next_tier: Option<LoyaltyTier>,
}

#[derive(Debug, Serialize)]
pub struct AdjustPointsResponse {
    pub account: LoyaltyAccount,
    pub transaction: LoyaltyTransaction,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(points: i32) -> AdjustPointsRequest {
        AdjustPointsRequest {
            user_id: Uuid::new_v4(),
            points,
            description: "Goodwill credit".to_string(),
        }
    }

    #[test]
    fn test_adjustment_points_are_bounded() {
        assert!(request(250).ensure_points_in_range().is_ok());
        assert!(request(-MAX_ADJUSTMENT_POINTS).ensure_points_in_range().is_ok());
        assert!(request(0).ensure_points_in_range().is_err());
        assert!(request(MAX_ADJUSTMENT_POINTS + 1).ensure_points_in_range().is_err());
        assert!(request(i32::MAX).ensure_points_in_range().is_err());
        assert!(request(i32::MIN).ensure_points_in_range().is_err());
    }
}
