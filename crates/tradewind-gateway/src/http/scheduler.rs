//! Recurring trading job endpoints.
//!
//! Each job fires POST /api/ai/chat/trader on its own schedule. One run
//! per job at a time; a fire that lands while the previous run is still
//! in flight is skipped, not queued.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use tradewind_core::{AnalysisTarget, FuturesSymbol};
use tradewind_scheduler::{IntervalUnit, SchedulerError};

use crate::app::AppState;
use crate::http::{error_response, ErrorBody};

#[derive(Deserialize)]
pub struct AddJobRequest {
    pub job_id: String,
    pub symbol: FuturesSymbol,
    #[serde(default = "default_kline_interval")]
    pub kline_interval: String,
    pub interval_value: u32,
    #[serde(default = "default_interval_unit")]
    pub interval_unit: String,
}

fn default_kline_interval() -> String {
    "1h".to_string()
}

fn default_interval_unit() -> String {
    "m".to_string()
}

#[derive(Deserialize)]
pub struct UpdateIntervalRequest {
    pub interval_value: u32,
}

/// GET /api/scheduler/jobs lists every job with its next fire time.
pub async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "running": state.scheduler.is_running(),
        "jobs": state.scheduler.list_status(),
    }))
}

/// POST /api/scheduler/jobs registers a recurring analysis job. Reusing a
/// job id replaces the existing schedule.
pub async fn add_job(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddJobRequest>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    let unit = IntervalUnit::from_code(&req.interval_unit);
    let mut target = AnalysisTarget::new(req.symbol);
    target.kline_interval = req.kline_interval;

    match state
        .scheduler
        .add_job(&req.job_id, target, req.interval_value, unit)
    {
        Ok(view) => Ok(Json(json!({ "job_id": req.job_id, "job": view }))),
        Err(e) => Err(map_scheduler_error(e)),
    }
}

/// DELETE /api/scheduler/jobs/{job_id}. Removing an unknown id reports
/// `"removed": false` rather than an error.
pub async fn remove_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Json<Value> {
    let removed = state.scheduler.remove_job(&job_id);
    Json(json!({ "job_id": job_id, "removed": removed }))
}

/// PUT /api/scheduler/jobs/{job_id}/interval reschedules a job, keeping
/// its unit and target.
pub async fn update_interval(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
    Json(req): Json<UpdateIntervalRequest>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    match state.scheduler.update_interval(&job_id, req.interval_value) {
        Ok(view) => Ok(Json(json!({ "job_id": job_id, "job": view }))),
        Err(e) => Err(map_scheduler_error(e)),
    }
}

/// POST /api/scheduler/start brings the trigger loop online.
pub async fn start(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorBody>)> {
    match state.scheduler.start() {
        Ok(()) => Ok(Json(json!({ "status": "started" }))),
        Err(e) => {
            warn!(error = %e, "scheduler start failed");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ))
        }
    }
}

/// POST /api/scheduler/stop pauses firing. Jobs and their schedules stay
/// registered.
pub async fn stop(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.scheduler.stop();
    Json(json!({ "status": "stopped" }))
}

fn map_scheduler_error(err: SchedulerError) -> (StatusCode, Json<ErrorBody>) {
    let status = match err {
        SchedulerError::InvalidInterval(_) | SchedulerError::InvalidSchedule { .. } => {
            StatusCode::BAD_REQUEST
        }
        SchedulerError::JobNotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}
