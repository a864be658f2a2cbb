use async_trait::async_trait;

use rolegate_core::AppResult;
use rolegate_domain::UserId;

/// User record returned by repository queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Canonical lowercased email address.
    pub email: String,
    /// Argon2id hash of the current one-time login code, if any.
    pub verification_code_hash: Option<String>,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Finds a user by their unique identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Creates a user and assigns the `default` role in one transaction.
    async fn create_with_default_role(&self, email: &str) -> AppResult<UserRecord>;

    /// Stores the hash of a freshly issued login code.
    async fn set_verification_code_hash(&self, user_id: UserId, code_hash: &str)
    -> AppResult<()>;

    /// Replaces the stored code hash only if it still equals `expected_hash`.
    ///
    /// Returns `false` when another request consumed the code first.
    async fn consume_verification_code(
        &self,
        user_id: UserId,
        expected_hash: &str,
        replacement_hash: &str,
    ) -> AppResult<bool>;
}

/// Port for login code hashing. Keeps the application free of direct
/// cryptographic library coupling.
pub trait CodeHasher: Send + Sync {
    /// Hashes a plaintext login code.
    fn hash_code(&self, code: &str) -> AppResult<String>;

    /// Verifies a plaintext login code against a stored hash.
    fn verify_code(&self, code: &str, hash: &str) -> AppResult<bool>;
}
