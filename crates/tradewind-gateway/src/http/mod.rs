//! HTTP route handlers. Each submodule owns one area of the API surface.

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

pub mod ai;
pub mod exchange;
pub mod health;
pub mod scheduler;

/// Error body shared by every route: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn error_response(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}
