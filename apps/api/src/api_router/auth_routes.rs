use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};

use crate::auth::rate_limits::{GET_TOKEN_PER_CLIENT, REQUEST_CODE_PER_CLIENT};
use crate::state::AppState;
use crate::{auth, middleware};

/// Login and refresh routes. They authenticate through the body or the refresh cookie.
///
/// The per-client budget is enforced here. The per-email budget needs the
/// parsed body, so the handlers check it.
pub(super) fn build_auth_routes(app_state: &AppState) -> Router<AppState> {
    let request_code_routes = Router::new()
        .route("/auth/requestcode", post(auth::request_code_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum::Extension(REQUEST_CODE_PER_CLIENT));

    let get_token_routes = Router::new()
        .route("/auth/gettoken", post(auth::get_token_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum::Extension(GET_TOKEN_PER_CLIENT));

    Router::new()
        .merge(request_code_routes)
        .merge(get_token_routes)
        .route("/auth/refreshtoken", get(auth::refresh_token_handler))
        .route("/auth/logout", post(auth::logout_handler))
}
