use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Admin, AdminRole};
use crate::utils::errors::AppError;

/// Datos para crear una cuenta de staff
pub struct NewAdmin<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone_number: Option<&'a str>,
    pub password_hash: &'a str,
    pub role: AdminRole,
    pub station_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, admin: NewAdmin<'_>) -> Result<Admin, AppError> {
        let created = sqlx::query_as::<_, Admin>(
            r#"
            INSERT INTO admins (id, first_name, last_name, email, phone_number, password_hash,
                                role, station_id, is_active, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(admin.first_name)
        .bind(admin.last_name)
        .bind(admin.email)
        .bind(admin.phone_number)
        .bind(admin.password_hash)
        .bind(admin.role.as_str())
        .bind(admin.station_id)
        .bind(admin.created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, AppError> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(admin)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError> {
        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(admin)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM admins WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    pub async fn super_admin_exists(&self) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM admins WHERE role = $1)")
            .bind(AdminRole::SuperAdmin.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }

    pub async fn touch_last_login(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE admins SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
