//! `tradewind-scheduler`: the recurring trade-analysis job orchestrator.
//!
//! # Overview
//!
//! Callers register jobs keyed by an opaque id; each job pairs an
//! [`tradewind_core::AnalysisTarget`] with an interval ("every N minutes" or
//! "every N hours"). The [`engine::TriggerEngine`] polls once a second and
//! dispatches every due job as an independent Tokio task, so a slow or
//! failing job never delays the others. The firing itself is a single HTTP
//! POST to the gateway's trader endpoint through one shared client.
//!
//! # Guarantees
//!
//! | Concern              | Behaviour                                         |
//! |----------------------|---------------------------------------------------|
//! | Duplicate ids        | Re-adding replaces; the old schedule is cancelled |
//! | Same-job overlap     | A due firing is skipped while one is in flight    |
//! | Firing failures      | Logged and absorbed; the schedule keeps running   |
//! | Stop / Start         | Pauses firings; definitions and handles survive   |

pub mod engine;
pub mod error;
pub mod executor;
pub mod schedule;
pub mod scheduler;
pub mod types;

pub use engine::{TriggerEngine, TriggerHandle};
pub use error::{Result, SchedulerError};
pub use executor::{AnalysisExecutor, SharedConnection};
pub use schedule::ScheduleSpec;
pub use scheduler::TradingScheduler;
pub use types::{IntervalUnit, JobDefinition, JobView};
