use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use rolegate_core::AppResult;

/// Counter store for fixed attempt windows.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Counts one attempt against `key` and returns the window it fell in.
    ///
    /// A window older than `window_seconds` starts over at one attempt.
    async fn record_attempt(&self, key: &str, window_seconds: i64) -> AppResult<AttemptWindow>;

    /// Drops windows that started before `cutoff`. Returns how many were removed.
    async fn cleanup_expired(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

/// Attempts counted so far in the active window of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptWindow {
    /// Attempts in the window, including the one just recorded.
    pub attempts: i32,
    /// Start of the window.
    pub started_at: DateTime<Utc>,
}

impl AttemptWindow {
    /// Seconds left until this window resets, never less than one.
    #[must_use]
    pub fn seconds_until_reset(&self, window_seconds: i64, now: DateTime<Utc>) -> i64 {
        let resets_at = self.started_at + Duration::seconds(window_seconds);
        (resets_at - now).num_seconds().max(1)
    }
}
