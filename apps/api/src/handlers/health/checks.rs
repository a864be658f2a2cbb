use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::*;

pub(super) async fn check_postgres(pool: sqlx::PgPool) -> HealthDependencyStatus {
    let check = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&pool)
        .await;

    match check {
        Ok(_) => HealthDependencyStatus {
            status: "ok",
            detail: None,
        },
        Err(error) => HealthDependencyStatus {
            status: "error",
            detail: Some(format!("postgres check failed: {error}")),
        },
    }
}

pub(super) async fn check_redis(connection: Option<ConnectionManager>) -> HealthDependencyStatus {
    let Some(mut connection) = connection else {
        return HealthDependencyStatus {
            status: "disabled",
            detail: None,
        };
    };

    match connection.ping::<String>().await {
        Ok(value) if value.eq_ignore_ascii_case("pong") => HealthDependencyStatus {
            status: "ok",
            detail: None,
        },
        Ok(value) => HealthDependencyStatus {
            status: "error",
            detail: Some(format!("unexpected redis ping response: {value}")),
        },
        Err(error) => HealthDependencyStatus {
            status: "error",
            detail: Some(format!("redis ping failed: {error}")),
        },
    }
}
