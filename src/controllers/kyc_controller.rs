//! Flujo KYC interno
//!
//! Solo se guardan los cuatro últimos dígitos del documento y una
//! referencia generada; la verificación la resuelve el personal.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::ApiResponse;
use crate::dto::kyc_dto::{KycStatusResponse, ReviewKycRequest, SubmitKycRequest};
use crate::models::{Actor, AdminRole, KycStatus, User};
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::{bad_request_error, not_found_error, AppError};
use crate::utils::reference::generate_reference;

const DEFAULT_REJECTION_REASON: &str = "Document could not be verified";

pub struct KycController {
    users: UserRepository,
}

impl KycController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    pub async fn submit(&self, actor: &Actor, request: SubmitKycRequest) -> Result<ApiResponse<KycStatusResponse>, AppError> {
        let user_id = actor.require_customer()?;
        request.validate()?;

        let user = self.find_user(user_id).await?;
        match user.kyc_status() {
            KycStatus::Verified => return Err(AppError::Conflict("KYC is already verified".to_string())),
            KycStatus::Pending => {
                return Err(AppError::Conflict(
                    "A KYC submission is already pending review".to_string(),
                ))
            }
            KycStatus::NotSubmitted | KycStatus::Rejected => {}
        }

        let document = request.document_number.trim();
        let last4 = &document[document.len().saturating_sub(4)..];
        let reference = generate_reference("KYC", 10);

        let updated = self.users.submit_kyc(user_id, &reference, last4).await?;

        info!("🪪 KYC enviado por usuario {} ({})", user_id, reference);

        Ok(ApiResponse::success_with_message(
            KycStatusResponse::from(&updated),
            "KYC submitted for review",
        ))
    }

    pub async fn status(&self, actor: &Actor) -> Result<ApiResponse<KycStatusResponse>, AppError> {
        let user_id = actor.require_customer()?;
        let user = self.find_user(user_id).await?;

        Ok(ApiResponse::success(KycStatusResponse::from(&user)))
    }

    /// Aprobar o rechazar una solicitud pendiente
    pub async fn review(
        &self,
        actor: &Actor,
        user_id: Uuid,
        request: ReviewKycRequest,
    ) -> Result<ApiResponse<KycStatusResponse>, AppError> {
        let admin_id = actor.require_role(&[AdminRole::SuperAdmin, AdminRole::SupportStaff])?;
        request.validate()?;

        self.find_user(user_id).await?;

        let (status, reason) = if request.approved {
            (KycStatus::Verified, None)
        } else {
            let reason = request
                .reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_REJECTION_REASON);
            (KycStatus::Rejected, Some(reason))
        };

        let updated = self
            .users
            .review_kyc(user_id, status, reason)
            .await?
            .ok_or_else(|| bad_request_error("Only pending KYC submissions can be reviewed"))?;

        info!("🪪 KYC de usuario {} → {} por admin {}", user_id, status, admin_id);

        Ok(ApiResponse::success(KycStatusResponse::from(&updated)))
    }

    async fn find_user(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("User", &id.to_string()))
    }
}
