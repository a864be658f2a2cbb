//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use sqlx::PgPool;

use rolegate_application::{UserRecord, UserRepository};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{DEFAULT_ROLE, UserId};

mod account;
mod lookup;


/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    email: String,
    verification_code_hash: Option<String>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            email: row.email,
            verification_code_hash: row.verification_code_hash,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        self.find_by_email_impl(email).await
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        self.find_by_id_impl(user_id).await
    }

    async fn create_with_default_role(&self, email: &str) -> AppResult<UserRecord> {
        self.create_with_default_role_impl(email).await
    }

    async fn set_verification_code_hash(
        &self,
        user_id: UserId,
        code_hash: &str,
    ) -> AppResult<()> {
        self.set_verification_code_hash_impl(user_id, code_hash)
            .await
    }

    async fn consume_verification_code(
        &self,
        user_id: UserId,
        expected_hash: &str,
        replacement_hash: &str,
    ) -> AppResult<bool> {
        self.consume_verification_code_impl(user_id, expected_hash, replacement_hash)
            .await
    }
}

fn email_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict("an account with this email already exists".to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}
