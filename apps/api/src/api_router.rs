use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get};
use rolegate_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod auth_routes;
mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/api/roles",
            get(handlers::security::list_roles_handler)
                .post(handlers::security::save_role_handler),
        )
        .route(
            "/api/roles/{role_name}",
            delete(handlers::security::delete_role_handler),
        )
        .route(
            "/api/permissions",
            get(handlers::security::list_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/roles",
            get(handlers::security::list_user_roles_handler)
                .post(handlers::security::assign_role_handler),
        )
        .route(
            "/api/users/{user_id}/roles/{role_name}",
            delete(handlers::security::unassign_role_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(auth_routes::build_auth_routes(&app_state))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
