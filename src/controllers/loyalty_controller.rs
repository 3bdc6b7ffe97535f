use sqlx::PgPool;
use tracing::info;
use validator::Validate;

use crate::dto::common_dto::{ApiResponse, PaginatedResponse};
use crate::dto::loyalty_dto::{AdjustPointsRequest, AdjustPointsResponse, LoyaltySummaryResponse};
use crate::models::{Actor, AdminRole, LoyaltyTier, LoyaltyTransaction, LoyaltyTransactionType};
use crate::repositories::loyalty_repository::{LoyaltyRepository, NewLoyaltyTransaction};
use crate::repositories::user_repository::UserRepository;
use crate::services::loyalty_service;
use crate::utils::errors::{not_found_error, AppError};
use crate::utils::pagination::{PageMeta, Pagination};

pub struct LoyaltyController {
    pool: PgPool,
    repository: LoyaltyRepository,
    users: UserRepository,
}

impl LoyaltyController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: LoyaltyRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Cuenta del cliente (se crea en BASIC la primera vez)
    pub async fn me(&self, actor: &Actor) -> Result<ApiResponse<LoyaltySummaryResponse>, AppError> {
        let user_id = actor.require_customer()?;

        let account = self.repository.get_or_create(user_id).await?;
        let next_tier = next_tier(account.tier());

        Ok(ApiResponse::success(LoyaltySummaryResponse { account, next_tier }))
    }

    /// Historial de movimientos, el más reciente primero
    pub async fn transactions(
        &self,
        actor: &Actor,
        pagination: Pagination,
    ) -> Result<ApiResponse<PaginatedResponse<LoyaltyTransaction>>, AppError> {
        let user_id = actor.require_customer()?;

        let (transactions, total) = self.repository.list_transactions(user_id, pagination).await?;
        Ok(ApiResponse::success(PaginatedResponse::new(
            transactions,
            PageMeta::new(total, pagination),
        )))
    }

    /// Ajuste manual de puntos con signo
    pub async fn adjust(
        &self,
        actor: &Actor,
        request: AdjustPointsRequest,
    ) -> Result<ApiResponse<AdjustPointsResponse>, AppError> {
        let admin_id = actor.require_role(&[AdminRole::SuperAdmin, AdminRole::SupportStaff])?;
        request.validate()?;

        request.ensure_points_in_range()?;

        if self.users.find_by_id(request.user_id).await?.is_none() {
            return Err(not_found_error("User", &request.user_id.to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let account = LoyaltyRepository::lock_or_create(&mut tx, request.user_id).await?;
        let balances = loyalty_service::apply_adjustment(&account, request.points)?;

        let updated = LoyaltyRepository::update_balances(&mut tx, account.id, &balances, false).await?;
        let transaction = LoyaltyRepository::insert_transaction(
            &mut tx,
            NewLoyaltyTransaction {
                user_id: request.user_id,
                loyalty_id: account.id,
                transaction_type: LoyaltyTransactionType::Adjusted,
                points: request.points,
                balance_before: account.available_points,
                balance_after: balances.available_points,
                description: Some(request.description.trim().to_string()),
                source: Some("ADMIN".to_string()),
                source_id: None,
                created_by: Some(admin_id),
            },
        )
        .await?;

        tx.commit().await?;

        info!(
            "⭐ Ajuste de {} puntos para usuario {} por admin {}",
            request.points, request.user_id, admin_id
        );

        Ok(ApiResponse::success_with_message(
            AdjustPointsResponse {
                account: updated,
                transaction,
            },
            "Loyalty points adjusted",
        ))
    }
}

/// Nivel inmediatamente superior, si existe
fn next_tier(current: LoyaltyTier) -> Option<LoyaltyTier> {
    LoyaltyTier::ALL.iter().copied().find(|tier| *tier > current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_tier() {
        assert_eq!(next_tier(LoyaltyTier::Basic), Some(LoyaltyTier::Silver));
        assert_eq!(next_tier(LoyaltyTier::Gold), Some(LoyaltyTier::Platinum));
        assert_eq!(next_tier(LoyaltyTier::Platinum), None);
    }
}
