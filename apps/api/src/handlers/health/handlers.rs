use super::checks::{check_postgres, check_redis};
use super::*;

/// Reports Postgres and, when configured, Redis reachability.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let postgres = check_postgres(state.postgres_pool.clone()).await;
    let redis = check_redis(state.redis_connection.clone()).await;

    let ready = is_ready(&postgres, &redis);
    let http_status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(HealthResponse {
            status: if ready { "ok" } else { "degraded" },
            postgres,
            redis,
        }),
    )
}

fn is_ready(postgres: &HealthDependencyStatus, redis: &HealthDependencyStatus) -> bool {
    postgres.status == "ok" && redis.status != "error"
}
