//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_code_hasher;
mod console_email_service;
mod jwt_token_signer;
mod postgres_event_log;
mod postgres_rate_limit_repository;
mod postgres_refresh_token_repository;
mod postgres_role_repository;
mod postgres_security_admin_repository;
mod postgres_user_repository;
mod redis_rate_limit_repository;
mod smtp_email_service;

pub use argon2_code_hasher::Argon2CodeHasher;
pub use console_email_service::ConsoleEmailService;
pub use jwt_token_signer::{JwtTokenSigner, TokenKeyConfig};
pub use postgres_event_log::PostgresEventLog;
pub use postgres_rate_limit_repository::PostgresRateLimitRepository;
pub use postgres_refresh_token_repository::PostgresRefreshTokenRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_security_admin_repository::PostgresSecurityAdminRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use redis_rate_limit_repository::RedisRateLimitRepository;
pub use smtp_email_service::{SmtpEmailConfig, SmtpEmailService};
