//! Append-only event tables.
//!
//! `audit_events` records role administration by an authenticated actor.
//! `auth_events` records login, refresh and logout outcomes, which may have
//! no subject when the presented email or token matched nobody. Rows carry
//! the time the event happened rather than the time the insert ran.

use async_trait::async_trait;
use sqlx::PgPool;

use rolegate_application::{AuditEvent, AuditRepository, AuthEvent, AuthEventRepository};
use rolegate_core::{AppError, AppResult};

/// PostgreSQL event log backing both the audit and the auth event ports.
#[derive(Clone)]
pub struct PostgresEventLog {
    pool: PgPool,
}

impl PostgresEventLog {
    /// Creates an event log over the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresEventLog {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let action = event.action.as_str();
        sqlx::query(
            r#"
            INSERT INTO audit_events (subject, action, resource_type, resource_id, detail, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.subject)
        .bind(action)
        .bind(event.resource_type)
        .bind(event.resource_id)
        .bind(event.detail)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to record '{action}' audit event: {error}"))
        })?;

        Ok(())
    }
}

#[async_trait]
impl AuthEventRepository for PostgresEventLog {
    async fn append_event(&self, event: AuthEvent) -> AppResult<()> {
        let event_type = event.event_type.as_str();
        sqlx::query(
            r#"
            INSERT INTO auth_events (subject, event_type, outcome, ip_address, user_agent, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.subject)
        .bind(event_type)
        .bind(event.outcome)
        .bind(event.ip_address)
        .bind(event.user_agent)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to record '{event_type}' auth event: {error}"))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use rolegate_application::{
        AuditEvent, AuditRepository, AuthEvent, AuthEventRepository, AuthEventType,
        RequestContext,
    };
    use rolegate_domain::AuditAction;
    use sqlx::PgPool;
    use sqlx::migrate::Migrator;
    use sqlx::postgres::PgPoolOptions;

    use super::PostgresEventLog;

    static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

    async fn test_pool() -> Option<PgPool> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return None;
        };
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url.as_str())
            .await
            .unwrap_or_else(|error| panic!("failed to connect to DATABASE_URL: {error}"));
        if let Err(error) = MIGRATOR.run(&pool).await {
            panic!("failed to run migrations for event log tests: {error}");
        }
        Some(pool)
    }

    #[tokio::test]
    async fn auth_events_keep_the_time_they_happened() {
        let Some(pool) = test_pool().await else {
            return;
        };
        let log = PostgresEventLog::new(pool.clone());
        let subject = uuid::Uuid::new_v4().to_string();
        let context = RequestContext {
            ip_address: Some("203.0.113.9".to_owned()),
            user_agent: Some("event-log-test".to_owned()),
        };
        let mut event = AuthEvent::new(
            AuthEventType::RefreshTokenReuse,
            "revoked",
            Some(subject.clone()),
            &context,
        );
        event.occurred_at = Utc::now() - Duration::minutes(5);
        let occurred_at = event.occurred_at;

        assert!(AuthEventRepository::append_event(&log, event).await.is_ok());

        let row = sqlx::query_as::<_, (String, String, Option<String>, DateTime<Utc>)>(
            r#"
            SELECT event_type, outcome, ip_address, created_at
            FROM auth_events
            WHERE subject = $1
            "#,
        )
        .bind(&subject)
        .fetch_one(&pool)
        .await
        .unwrap_or_else(|error| panic!("auth event should be stored: {error}"));
        assert_eq!(row.0, "refresh_token_reuse");
        assert_eq!(row.1, "revoked");
        assert_eq!(row.2.as_deref(), Some("203.0.113.9"));
        assert_eq!(row.3.timestamp_micros(), occurred_at.timestamp_micros());
    }

    #[tokio::test]
    async fn audit_events_record_the_action_label() {
        let Some(pool) = test_pool().await else {
            return;
        };
        let log = PostgresEventLog::new(pool.clone());
        let resource_id = uuid::Uuid::new_v4().to_string();
        let event = AuditEvent {
            subject: "admin@example.com".to_owned(),
            action: AuditAction::SecurityRoleAssigned,
            resource_type: "user_role".to_owned(),
            resource_id: resource_id.clone(),
            detail: Some("assigned role 'editor'".to_owned()),
            occurred_at: Utc::now(),
        };

        assert!(AuditRepository::append_event(&log, event).await.is_ok());

        let action = sqlx::query_scalar::<_, String>(
            r#"
            SELECT action
            FROM audit_events
            WHERE resource_id = $1
            "#,
        )
        .bind(&resource_id)
        .fetch_one(&pool)
        .await
        .unwrap_or_else(|error| panic!("audit event should be stored: {error}"));
        assert_eq!(action, AuditAction::SecurityRoleAssigned.as_str());
    }
}
