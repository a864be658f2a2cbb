use rolegate_domain::EmailAddress;

use crate::RequestContext;

/// Client bucket shared by requests whose address could not be determined.
const UNKNOWN_CLIENT: &str = "unknown";

/// What a rule counts attempts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitScope {
    /// The client address resolved for the request.
    ClientIp,
    /// The normalized email address named in the request body.
    Email,
}

impl RateLimitScope {
    /// Returns the label used in storage keys and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientIp => "ip",
            Self::Email => "email",
        }
    }
}

/// Attempt budget for one endpoint and one subject kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    category: &'static str,
    scope: RateLimitScope,
    max_attempts: i32,
    window_seconds: i64,
}

impl RateLimitRule {
    /// Allows `max_attempts` per client address per window.
    #[must_use]
    pub const fn per_client(category: &'static str, max_attempts: i32, window_seconds: i64) -> Self {
        Self {
            category,
            scope: RateLimitScope::ClientIp,
            max_attempts,
            window_seconds,
        }
    }

    /// Allows `max_attempts` per normalized email per window.
    #[must_use]
    pub const fn per_email(category: &'static str, max_attempts: i32, window_seconds: i64) -> Self {
        Self {
            category,
            scope: RateLimitScope::Email,
            max_attempts,
            window_seconds,
        }
    }

    /// Endpoint category, e.g. `"get_token"`.
    #[must_use]
    pub fn category(&self) -> &'static str {
        self.category
    }

    /// Subject kind this rule counts.
    #[must_use]
    pub fn scope(&self) -> RateLimitScope {
        self.scope
    }

    /// Attempts allowed per window.
    #[must_use]
    pub fn max_attempts(&self) -> i32 {
        self.max_attempts
    }

    /// Window length in seconds.
    #[must_use]
    pub fn window_seconds(&self) -> i64 {
        self.window_seconds
    }

    /// Picks the counted subject for one request.
    ///
    /// Email rules return `None` for a missing or malformed address, which the
    /// endpoint rejects on its own. `Alice@Example.com` and `alice@example.com`
    /// share one subject.
    pub(super) fn subject(&self, context: &RequestContext, email: Option<&str>) -> Option<String> {
        match self.scope {
            RateLimitScope::ClientIp => Some(
                context
                    .ip_address
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned()),
            ),
            RateLimitScope::Email => email
                .and_then(|email| EmailAddress::new(email).ok())
                .map(|email| email.as_str().to_owned()),
        }
    }

    pub(super) fn storage_key(&self, subject: &str) -> String {
        format!("{}:{}:{subject}", self.category, self.scope.as_str())
    }
}
