use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{LoyaltyAccount, LoyaltyTier, LoyaltyTransaction, LoyaltyTransactionType};
use crate::services::loyalty_service::{self, LoyaltyBalances};
use crate::utils::errors::AppError;
use crate::utils::pagination::Pagination;

/// Movimiento de puntos a registrar
#[derive(Debug, Clone)]
pub struct NewLoyaltyTransaction {
    pub user_id: Uuid,
    pub loyalty_id: Uuid,
    pub transaction_type: LoyaltyTransactionType,
    pub points: i32,
    pub balance_before: i32,
    pub balance_after: i32,
    pub description: Option<String>,
    pub source: Option<String>,
    pub source_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

pub struct LoyaltyRepository {
    pool: PgPool,
}

impl LoyaltyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cuenta del usuario, creada en BASIC si no existe
    pub async fn get_or_create(&self, user_id: Uuid) -> Result<LoyaltyAccount, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::lock_or_create(&mut conn, user_id).await
    }

    /// Igual que `get_or_create` pero bloqueando la fila dentro de una transacción
    pub async fn lock_or_create(conn: &mut PgConnection, user_id: Uuid) -> Result<LoyaltyAccount, AppError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO loyalty_accounts (id, user_id, total_points, available_points, redeemed_points,
                                          lifetime_points, current_tier, tier_start_date,
                                          points_to_next_tier, created_at, updated_at)
            VALUES ($1, $2, 0, 0, 0, 0, $3, $4, $5, $4, $4)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(LoyaltyTier::Basic.as_str())
        .bind(now)
        .bind(loyalty_service::points_to_next_tier(0))
        .execute(&mut *conn)
        .await?;

        let account = sqlx::query_as::<_, LoyaltyAccount>(
            "SELECT * FROM loyalty_accounts WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(account)
    }

    /// Nivel actual sin crear la cuenta
    pub async fn find_tier(conn: &mut PgConnection, user_id: Uuid) -> Result<LoyaltyTier, AppError> {
        let tier: Option<(String,)> =
            sqlx::query_as("SELECT current_tier FROM loyalty_accounts WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(conn)
                .await?;

        Ok(tier
            .and_then(|(raw,)| raw.parse().ok())
            .unwrap_or(LoyaltyTier::Basic))
    }

    pub async fn update_balances(
        conn: &mut PgConnection,
        account_id: Uuid,
        balances: &LoyaltyBalances,
        earned: bool,
    ) -> Result<LoyaltyAccount, AppError> {
        let account = sqlx::query_as::<_, LoyaltyAccount>(
            r#"
            UPDATE loyalty_accounts
            SET total_points = $2, available_points = $3, redeemed_points = $4, lifetime_points = $5,
                current_tier = $6, points_to_next_tier = $7,
                tier_start_date = CASE WHEN $8 THEN $9 ELSE tier_start_date END,
                last_points_earned_date = CASE WHEN $10 THEN $9 ELSE last_points_earned_date END,
                updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(account_id)
        .bind(balances.total_points)
        .bind(balances.available_points)
        .bind(balances.redeemed_points)
        .bind(balances.lifetime_points)
        .bind(balances.tier.as_str())
        .bind(balances.points_to_next_tier)
        .bind(balances.tier_changed)
        .bind(Utc::now())
        .bind(earned)
        .fetch_one(conn)
        .await?;

        Ok(account)
    }

    pub async fn insert_transaction(
        conn: &mut PgConnection,
        transaction: NewLoyaltyTransaction,
    ) -> Result<LoyaltyTransaction, AppError> {
        let created = sqlx::query_as::<_, LoyaltyTransaction>(
            r#"
            INSERT INTO loyalty_transactions (id, user_id, loyalty_id, transaction_type, points,
                                              balance_before, balance_after, description, source,
                                              source_id, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(transaction.user_id)
        .bind(transaction.loyalty_id)
        .bind(transaction.transaction_type.as_str())
        .bind(transaction.points)
        .bind(transaction.balance_before)
        .bind(transaction.balance_after)
        .bind(transaction.description)
        .bind(transaction.source)
        .bind(transaction.source_id)
        .bind(transaction.created_by)
        .bind(Utc::now())
        .fetch_one(conn)
        .await?;

        Ok(created)
    }

    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> Result<(Vec<LoyaltyTransaction>, i64), AppError> {
        let transactions = sqlx::query_as::<_, LoyaltyTransaction>(
            r#"
            SELECT * FROM loyalty_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM loyalty_transactions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((transactions, total.0))
    }
}
