use std::sync::Arc;

use rolegate_application::EmailService;
use rolegate_core::AppError;
use rolegate_infrastructure::{ConsoleEmailService, SmtpEmailConfig, SmtpEmailService};
use tracing::info;

use crate::api_config::{ApiConfig, EmailProviderConfig, SmtpRuntimeConfig};

/// Picks the login code delivery channel.
pub(super) fn build_email_service(config: &ApiConfig) -> Result<Arc<dyn EmailService>, AppError> {
    match &config.email_provider {
        EmailProviderConfig::Console => {
            info!("login codes are written to the log");
            Ok(Arc::new(ConsoleEmailService::new()))
        }
        EmailProviderConfig::Smtp(smtp) => {
            info!(host = %smtp.host, port = smtp.port, "login codes are sent over smtp");
            Ok(Arc::new(SmtpEmailService::new(smtp_email_config(smtp))?))
        }
    }
}

fn smtp_email_config(smtp: &SmtpRuntimeConfig) -> SmtpEmailConfig {
    SmtpEmailConfig {
        host: smtp.host.clone(),
        port: smtp.port,
        username: smtp.username.clone(),
        password: smtp.password.clone(),
        from_address: smtp.from_address.clone(),
    }
}
