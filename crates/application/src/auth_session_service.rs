//! Code-based login, refresh token rotation and logout.
//!
//! Refresh tokens are signed, and each one is valid only while its SHA-256
//! hash is in the owner's stored set. Rotation swaps the presented hash for
//! the new one atomically. A signed token that is not in any set means the
//! token leaked and was already rotated, so the owner's whole set is revoked.

mod access;
mod login;
mod logout;
mod refresh;
mod token_crypto;


use std::sync::Arc;

use rolegate_core::{AppError, AppResult, IdentityRole};
use rolegate_domain::EmailAddress;

use crate::{
    AuthEventService, AuthorizationService, CodeHasher, EmailService, RefreshTokenRepository,
    TokenKind, TokenSigner, UserRecord, UserRepository,
};

/// User summary returned with an issued session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    /// User id.
    pub id: String,
    /// Canonical email.
    pub email: String,
    /// Effective roles as `{id, name}` pairs.
    pub roles: Vec<IdentityRole>,
}

/// Tokens and identity produced by a successful login or rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    /// Bearer access token.
    pub access_token: String,
    /// Refresh token to store in the cookie.
    pub refresh_token: String,
    /// Cookie max-age in seconds.
    pub refresh_max_age_seconds: i64,
    /// Authenticated user summary.
    pub user: SessionUser,
    /// Effective permission names, sorted.
    pub permissions: Vec<String>,
}

/// Optional allow-list of email domains that may request login codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailDomainPolicy {
    allowed_domains: Vec<String>,
}

impl EmailDomainPolicy {
    /// Creates a policy. An empty list allows every domain.
    #[must_use]
    pub fn new(allowed_domains: Vec<String>) -> Self {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|domain| domain.trim().to_lowercase())
                .filter(|domain| !domain.is_empty())
                .collect(),
        }
    }

    /// Rejects addresses outside the allow-list.
    pub fn check(&self, email: &EmailAddress) -> AppResult<()> {
        if self.allowed_domains.is_empty()
            || self
                .allowed_domains
                .iter()
                .any(|domain| domain == email.domain())
        {
            return Ok(());
        }

        Err(AppError::Validation(format!(
            "email domain '{}' is not allowed",
            email.domain()
        )))
    }
}

/// Storage and crypto ports used by [`AuthSessionService`].
#[derive(Clone)]
pub struct AuthSessionPorts {
    /// User persistence.
    pub user_repository: Arc<dyn UserRepository>,
    /// Refresh token set persistence.
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    /// Login code hashing.
    pub code_hasher: Arc<dyn CodeHasher>,
    /// Access and refresh token signing.
    pub token_signer: Arc<dyn TokenSigner>,
    /// Login code delivery.
    pub email_service: Arc<dyn EmailService>,
}

/// Application service for login sessions.
#[derive(Clone)]
pub struct AuthSessionService {
    ports: AuthSessionPorts,
    authorization: AuthorizationService,
    auth_events: AuthEventService,
    domain_policy: EmailDomainPolicy,
}

impl AuthSessionService {
    /// Creates a new session service.
    #[must_use]
    pub fn new(
        ports: AuthSessionPorts,
        authorization: AuthorizationService,
        auth_events: AuthEventService,
        domain_policy: EmailDomainPolicy,
    ) -> Self {
        Self {
            ports,
            authorization,
            auth_events,
            domain_policy,
        }
    }

    /// Signs a fresh access token and assembles the session payload.
    ///
    /// Callers run this before committing any token or code state, so a
    /// signing or role lookup failure leaves the stored sets untouched.
    async fn prepare_session(
        &self,
        user: &UserRecord,
        refresh_token: String,
    ) -> AppResult<IssuedSession> {
        let subject = user.id.to_string();
        let access_token = self.ports.token_signer.sign(&subject, TokenKind::Access)?;
        let identity = self
            .authorization
            .identity_for_user(user.id, &user.email)
            .await?;

        Ok(IssuedSession {
            access_token,
            refresh_token,
            refresh_max_age_seconds: self.ports.token_signer.lifetime_seconds(TokenKind::Refresh),
            user: SessionUser {
                id: subject,
                email: user.email.clone(),
                roles: identity.roles().to_vec(),
            },
            permissions: identity.permissions().iter().cloned().collect(),
        })
    }
}
