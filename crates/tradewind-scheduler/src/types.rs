use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use tradewind_core::AnalysisTarget;

/// Unit of a job's recurrence interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    #[serde(alias = "m")]
    Minutes,
    #[serde(alias = "h")]
    Hours,
}

impl IntervalUnit {
    /// Resolve a wire code (`"m"`, `"h"`, or the full word) to a unit.
    /// Unknown codes deterministically resolve to minutes.
    pub fn from_code(code: &str) -> Self {
        match code {
            "m" | "minutes" => IntervalUnit::Minutes,
            "h" | "hours" => IntervalUnit::Hours,
            other => {
                warn!(code = %other, "unknown interval unit, defaulting to minutes");
                IntervalUnit::Minutes
            }
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            IntervalUnit::Minutes => "m",
            IntervalUnit::Hours => "h",
        }
    }
}

impl std::fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IntervalUnit::Minutes => "minutes",
            IntervalUnit::Hours => "hours",
        };
        write!(f, "{s}")
    }
}

/// A registered recurring analysis job.
#[derive(Debug, Clone)]
pub struct JobDefinition {
    /// Caller-supplied unique id, immutable once created.
    pub id: String,
    /// Payload template posted downstream on every firing.
    pub target: AnalysisTarget,
    /// Recurrence: fire every `interval_value` `interval_unit`.
    pub interval_value: u32,
    pub interval_unit: IntervalUnit,
}

/// Point-in-time view of one job, as returned by status queries.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub symbol: String,
    pub interval_value: u32,
    pub interval_unit: IntervalUnit,
    /// Next planned firing, refreshed by the engine after each dispatch.
    /// `None` once the schedule has no future occurrence.
    pub next_fire_time: Option<DateTime<Utc>>,
}
