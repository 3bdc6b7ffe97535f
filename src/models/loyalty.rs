//! Modelos del programa de fidelización

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum! {
    /// Nivel de fidelización, ordenado de menor a mayor
    LoyaltyTier {
        Basic => "BASIC",
        Silver => "SILVER",
        Gold => "GOLD",
        Platinum => "PLATINUM",
    }
}

text_enum! {
    LoyaltyTransactionType {
        Earned => "EARNED",
        Redeemed => "REDEEMED",
        Adjusted => "ADJUSTED",
        Bonus => "BONUS",
    }
}

/// Cuenta de puntos de un cliente - tabla loyalty_accounts
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoyaltyAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_points: i32,
    pub available_points: i32,
    pub redeemed_points: i32,
    pub lifetime_points: i32,
    pub current_tier: String,
    pub tier_start_date: Option<DateTime<Utc>>,
    pub points_to_next_tier: Option<i32>,
    pub last_points_earned_date: Option<DateTime<Utc>>,
    pub last_points_redeemed_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoyaltyAccount {
    pub fn tier(&self) -> LoyaltyTier {
        self.current_tier.parse().unwrap_or(LoyaltyTier::Basic)
    }
}

/// Movimiento de puntos - tabla loyalty_transactions
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoyaltyTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub loyalty_id: Uuid,
    pub transaction_type: String,
    pub points: i32,
    pub balance_before: i32,
    pub balance_after: i32,
    pub description: Option<String>,
    pub source: Option<String>,
    pub source_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
