use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health, a liveness probe that returns server metadata.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now(),
        "default_service": state.config.default_service,
        "scheduler_running": state.scheduler.is_running(),
        "jobs": state.scheduler.job_count(),
    }))
}

/// GET /health/ready, a readiness probe for orchestrators.
pub async fn ready_handler() -> Json<Value> {
    Json(json!({ "status": "ready" }))
}
