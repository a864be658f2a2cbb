//! Email service that writes messages to the log instead of sending them.

use async_trait::async_trait;
use tracing::info;

use rolegate_application::EmailService;
use rolegate_core::AppResult;

/// Development email service. Login codes appear in the server log.
#[derive(Clone, Default)]
pub struct ConsoleEmailService;

impl ConsoleEmailService {
    /// Creates a new console email service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailService for ConsoleEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        _html_body: Option<&str>,
    ) -> AppResult<()> {
        info!(to, subject, body = text_body, "email written to console");
        Ok(())
    }
}
