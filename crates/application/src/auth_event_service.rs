use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use rolegate_core::AppResult;

/// Stable authentication event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventType {
    /// A login code was requested.
    LoginCodeRequested,
    /// A login with email and code was attempted.
    CodeLogin,
    /// A refresh token rotation was attempted.
    TokenRefresh,
    /// A refresh token outside the stored set was presented.
    RefreshTokenReuse,
    /// A refresh token was presented for logout.
    Logout,
}

impl AuthEventType {
    /// Returns the stored event type label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoginCodeRequested => "login_code_requested",
            Self::CodeLogin => "code_login",
            Self::TokenRefresh => "token_refresh",
            Self::RefreshTokenReuse => "refresh_token_reuse",
            Self::Logout => "logout",
        }
    }
}

/// Caller metadata captured from the HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Caller IP address if available.
    pub ip_address: Option<String>,
    /// Caller user-agent if available.
    pub user_agent: Option<String>,
}

/// Authentication event payload for security analytics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    /// Subject if available.
    pub subject: Option<String>,
    /// Event kind.
    pub event_type: AuthEventType,
    /// Event outcome label.
    pub outcome: String,
    /// Caller IP address if available.
    pub ip_address: Option<String>,
    /// Caller user-agent if available.
    pub user_agent: Option<String>,
    /// When the event happened, independent of when it was persisted.
    pub occurred_at: DateTime<Utc>,
}

impl AuthEvent {
    /// Builds an event carrying the caller metadata of `context`.
    #[must_use]
    pub fn new(
        event_type: AuthEventType,
        outcome: &str,
        subject: Option<String>,
        context: &RequestContext,
    ) -> Self {
        Self {
            subject,
            event_type,
            outcome: outcome.to_owned(),
            ip_address: context.ip_address.clone(),
            user_agent: context.user_agent.clone(),
            occurred_at: Utc::now(),
        }
    }
}

/// Repository port for auth event persistence.
#[async_trait]
pub trait AuthEventRepository: Send + Sync {
    /// Appends an auth event entry.
    async fn append_event(&self, event: AuthEvent) -> AppResult<()>;
}

/// Application service for auth event recording.
#[derive(Clone)]
pub struct AuthEventService {
    repository: Arc<dyn AuthEventRepository>,
}

impl AuthEventService {
    /// Creates a service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthEventRepository>) -> Self {
        Self { repository }
    }

    /// Persists an auth event, logging instead of failing when storage errors.
    ///
    /// Event storage never decides the outcome of a login, refresh or logout.
    pub async fn record_best_effort(&self, event: AuthEvent) {
        let event_type = event.event_type.as_str();
        if let Err(error) = self.repository.append_event(event).await {
            warn!(event_type, %error, "failed to record auth event");
        }
    }
}
