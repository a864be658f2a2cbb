use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use rolegate_core::AppError;
use tower_http::cors::CorsLayer;

pub(super) fn build_cors_layer(frontend_url: &str) -> Result<CorsLayer, AppError> {
    Ok(CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(frontend_url.trim_end_matches('/'))
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]))
}
