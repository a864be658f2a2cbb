use async_trait::async_trait;

use rolegate_core::AppResult;
use rolegate_domain::UserId;

/// Signed token flavours. Each kind has its own secret and lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived bearer token sent in the `Authorization` header.
    Access,
    /// Long-lived token carried by the refresh cookie.
    Refresh,
}

impl TokenKind {
    /// Returns the stable label embedded in token claims.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Claims recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// User id the token was issued for.
    pub subject: String,
    /// Issue time as unix seconds.
    pub issued_at: i64,
    /// Expiry time as unix seconds.
    pub expires_at: i64,
    /// Unique token identifier.
    pub token_id: String,
}

/// Port for signing and verifying access and refresh tokens.
pub trait TokenSigner: Send + Sync {
    /// Signs a new token of `kind` for `subject`. Every call yields a distinct token.
    fn sign(&self, subject: &str, kind: TokenKind) -> AppResult<String>;

    /// Verifies signature and expiry. Failures are `Unauthorized`.
    fn verify(&self, token: &str, kind: TokenKind) -> AppResult<TokenClaims>;

    /// Returns the lifetime configured for `kind`.
    fn lifetime_seconds(&self, kind: TokenKind) -> i64;
}

/// Repository port for the per-user refresh token set.
///
/// Tokens are addressed by their SHA-256 hash and matched exactly.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Returns the user whose set contains the hash.
    async fn find_owner(&self, token_hash: &str) -> AppResult<Option<UserId>>;

    /// Adds a hash to the user's set.
    async fn add(&self, user_id: UserId, token_hash: &str) -> AppResult<()>;

    /// Replaces `old_hash` by `new_hash` only if `old_hash` is still present.
    ///
    /// Returns `false` when the old hash was already gone.
    async fn swap(&self, user_id: UserId, old_hash: &str, new_hash: &str) -> AppResult<bool>;

    /// Removes one hash. Returns whether it was present.
    async fn remove(&self, user_id: UserId, token_hash: &str) -> AppResult<bool>;

    /// Empties the user's set. Returns the number of removed hashes.
    async fn revoke_all(&self, user_id: UserId) -> AppResult<u64>;

    /// Empties the user's set and stores `token_hash` as its only member.
    async fn replace_all(&self, user_id: UserId, token_hash: &str) -> AppResult<()>;

    /// Lists the hashes currently stored for the user.
    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<String>>;
}

/// Port for sending emails. Infrastructure provides SMTP or console implementations.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends a plain-text or HTML email.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()>;
}
