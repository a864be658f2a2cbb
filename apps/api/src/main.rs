//! Rolegate API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::time::Duration;

use rolegate_application::RateLimitService;
use rolegate_core::AppError;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{build_app_state, connect_and_migrate};

const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let pool = connect_and_migrate(&config.database_url).await?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let app_state = build_app_state(pool, &config).await?;
    spawn_rate_limit_cleanup(app_state.rate_limit_service.clone());

    let app = build_router(app_state, &config.frontend_url)?;
    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(%address, inclusion_depth = ?config.inclusion_depth, "api listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|error| AppError::Internal(format!("server error: {error}")))
}

fn spawn_rate_limit_cleanup(rate_limit_service: RateLimitService) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match rate_limit_service.cleanup().await {
                Ok(removed) if removed > 0 => info!(removed, "removed expired rate limit windows"),
                Ok(_) => {}
                Err(error) => warn!(%error, "rate limit cleanup failed"),
            }
        }
    });
}
