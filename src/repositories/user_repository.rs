use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{KycStatus, User};
use crate::utils::errors::AppError;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        district: Option<&str>,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, phone, district, password_hash, kyc_status, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(district)
        .bind(password_hash)
        .bind(KycStatus::NotSubmitted.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    /// Registrar una solicitud KYC en estado PENDING
    pub async fn submit_kyc(&self, id: Uuid, reference: &str, document_last4: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET kyc_status = $2, kyc_reference = $3, kyc_document_last4 = $4,
                kyc_submitted_at = $5, kyc_verified_at = NULL, kyc_rejection_reason = NULL,
                updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(KycStatus::Pending.as_str())
        .bind(reference)
        .bind(document_last4)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Resolver una solicitud KYC pendiente
    pub async fn review_kyc(
        &self,
        id: Uuid,
        status: KycStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let now = Utc::now();
        let verified_at = (status == KycStatus::Verified).then_some(now);

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET kyc_status = $2, kyc_verified_at = $3, kyc_rejection_reason = $4, updated_at = $5
            WHERE id = $1 AND kyc_status = $6
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(verified_at)
        .bind(rejection_reason)
        .bind(now)
        .bind(KycStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
