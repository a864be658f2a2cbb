use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use rolegate_core::{AppError, AppResult};

use crate::RequestContext;

use super::ports::RateLimitRepository;
use super::rule::RateLimitRule;

/// Windows are kept this long before cleanup removes them.
const RETENTION_HOURS: i64 = 24;

/// Application service for rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates a new rate limit service.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Counts one attempt under `rule` and rejects it once the window is spent.
    ///
    /// `email` is only read by per-email rules. Returns
    /// `AppError::RateLimited` carrying the seconds until the window resets.
    pub async fn check_rate_limit(
        &self,
        rule: &RateLimitRule,
        context: &RequestContext,
        email: Option<&str>,
    ) -> AppResult<()> {
        let Some(subject) = rule.subject(context, email) else {
            return Ok(());
        };

        let window = self
            .repository
            .record_attempt(&rule.storage_key(&subject), rule.window_seconds())
            .await?;
        if window.attempts <= rule.max_attempts() {
            return Ok(());
        }

        let retry_after = window.seconds_until_reset(rule.window_seconds(), Utc::now());
        info!(
            category = rule.category(),
            scope = rule.scope().as_str(),
            attempts = window.attempts,
            retry_after,
            "rate limit exceeded"
        );
        Err(AppError::RateLimited(format!(
            "too many attempts, try again in {retry_after} seconds"
        )))
    }

    /// Removes windows that started more than a day ago.
    pub async fn cleanup(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::hours(RETENTION_HOURS);
        self.repository.cleanup_expired(cutoff).await
    }
}
