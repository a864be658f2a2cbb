//! SMTP delivery through `lettre`.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use rolegate_application::EmailService;
use rolegate_core::{AppError, AppResult};

/// SMTP connection settings.
#[derive(Clone)]
pub struct SmtpEmailConfig {
    /// SMTP relay hostname.
    pub host: String,
    /// SMTP relay port.
    pub port: u16,
    /// SMTP username.
    pub username: String,
    /// SMTP password.
    pub password: String,
    /// Sender address, optionally with a display name.
    pub from_address: String,
}

/// Email service sending through an authenticated SMTP relay.
#[derive(Clone)]
pub struct SmtpEmailService {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    /// Builds the relay transport from configuration.
    pub fn new(config: SmtpEmailConfig) -> AppResult<Self> {
        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|error| AppError::Validation(format!("invalid SMTP_FROM address: {error}")))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|error| {
                AppError::Internal(format!("failed to create SMTP transport: {error}"))
            })?
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self { from, transport })
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()> {
        let recipient = to
            .parse::<Mailbox>()
            .map_err(|error| AppError::Validation(format!("invalid recipient address: {error}")))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject);
        let message = match html_body {
            Some(html_body) => builder.multipart(MultiPart::alternative_plain_html(
                text_body.to_owned(),
                html_body.to_owned(),
            )),
            None => builder.singlepart(SinglePart::plain(text_body.to_owned())),
        }
        .map_err(|error| AppError::Internal(format!("failed to build email: {error}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|error| AppError::Internal(format!("failed to send email: {error}")))?;

        Ok(())
    }
}
