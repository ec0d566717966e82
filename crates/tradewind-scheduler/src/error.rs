use thiserror::Error;

/// Errors that can occur within the scheduler subsystem.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The requested interval is malformed (zero or otherwise unusable).
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// A cron expression failed to parse.
    #[error("Invalid schedule \"{expression}\": {reason}")]
    InvalidSchedule { expression: String, reason: String },

    /// No job with the given id is registered.
    #[error("Job not found: {id}")]
    JobNotFound { id: String },

    /// The shared HTTP client does not exist (scheduler not started, or
    /// already stopped). Firings fail fast instead of attempting a call.
    #[error("Shared connection unavailable: scheduler is not started")]
    ConnectionUnavailable,

    /// Transport-level failure (connect, timeout, TLS) during a firing.
    #[error("Downstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The downstream endpoint answered with a non-success status.
    #[error("Downstream returned status {status}: {body}")]
    Downstream { status: u16, body: String },

    /// The outbound payload could not be serialized.
    #[error("Payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
