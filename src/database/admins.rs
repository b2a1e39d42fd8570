use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Admin, NewAdmin};
use crate::error::ApiError;

/// Credential store: admin identity records keyed by username or email.
#[derive(Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look an account up by either unique identifier. Login accepts both
    /// in a single field, so one query covers both columns.
    pub async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<Admin>, ApiError> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, username, email, password_hash, role, created_at, updated_at \
             FROM admins WHERE username = $1 OR email = $1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    /// Resolve a verified token subject back to its account. A `None` here
    /// means the account was removed after the token was issued.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, ApiError> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, username, email, password_hash, role, created_at, updated_at \
             FROM admins WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    /// Insert a new account. Uniqueness on username and email is enforced by
    /// the store; a violation surfaces as `DuplicateIdentity`.
    pub async fn create(&self, new_admin: NewAdmin) -> Result<Admin, ApiError> {
        let result = sqlx::query_as::<_, Admin>(
            "INSERT INTO admins (username, email, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING id, username, email, password_hash, role, created_at, updated_at",
        )
        .bind(&new_admin.username)
        .bind(&new_admin.email)
        .bind(&new_admin.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(admin) => Ok(admin),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(ApiError::DuplicateIdentity)
            }
            Err(other) => Err(other.into()),
        }
    }
}
