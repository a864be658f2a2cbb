use axum::extract::{Extension, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use rolegate_application::RateLimitRule;
use rolegate_core::AppError;

use crate::auth::client_context;
use crate::error::ApiResult;
use crate::state::AppState;

/// Verifies the bearer access token and exposes the caller as `Extension<UserIdentity>`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(&request)
        .ok_or_else(|| AppError::Unauthorized("missing bearer access token".to_owned()))?;

    let identity = state
        .auth_session_service
        .authenticate_access_token(token)
        .await?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Counts one attempt per client address against the route's rule.
pub async fn rate_limit(
    State(state): State<AppState>,
    Extension(rule): Extension<RateLimitRule>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let context = client_context(
        request.headers(),
        request.extensions(),
        state.client_address_source,
    );

    state
        .rate_limit_service
        .check_rate_limit(&rule, &context, None)
        .await?;

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
