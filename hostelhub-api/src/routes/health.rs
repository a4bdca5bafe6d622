use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use hostelhub_shared::types::{ComponentCheck, HealthReport, HealthStatus};

use crate::AppState;

pub const SERVICE_NAME: &str = "hostelhub-api";

pub async fn banner() -> &'static str {
    "HostelHub API is running"
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let store = match state.store.ping() {
        Ok(()) => ComponentCheck::healthy("store"),
        Err(e) => {
            tracing::warn!(error = %e, "store health check failed");
            ComponentCheck::unhealthy("store", e.to_string())
        }
    };
    let report = HealthReport::from_checks(SERVICE_NAME, env!("CARGO_PKG_VERSION"), vec![store]);
    let status = match report.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (status, Json(report))
}

/// Prometheus exposition. Empty when no recorder is installed.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.as_ref().map(|h| h.render()).unwrap_or_default()
}
