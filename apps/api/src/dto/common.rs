use serde::Serialize;
use ts_rs::TS;

/// Status of one backing service.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "health-dependency-status.ts")]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "health-response.ts")]
pub struct HealthResponse {
    pub status: &'static str,
    pub postgres: HealthDependencyStatus,
    pub redis: HealthDependencyStatus,
}

/// Generic message response for auth flows.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "generic-message-response.ts")]
pub struct GenericMessageResponse {
    pub message: String,
}
