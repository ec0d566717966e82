use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule;

use crate::error::{Result, SchedulerError};
use crate::types::IntervalUnit;

/// Engine-level representation of "fire every N units".
///
/// Wraps a parsed cron schedule together with its source expression. The
/// expression dialect is the 6-field form `sec min hour dom mon dow` with the
/// seconds field pinned to `0`, so firings align to unit boundaries: every
/// 5 minutes fires at :00, :05, :10, and every 2 hours fires at minute 0 of
/// hours 0, 2, 4.
#[derive(Debug, Clone)]
pub struct ScheduleSpec {
    schedule: Schedule,
    expression: String,
}

impl ScheduleSpec {
    /// Build the schedule for "every `value` `unit`".
    ///
    /// Any positive `value` resolves; range policy (minutes 1-59, hours 1-23)
    /// is enforced by the registry before calling in, not here. A step
    /// larger than the field's range collapses to the field's anchor (every
    /// 80 minutes fires at minute 0 of each hour); the cron parser rejects
    /// such steps outright, so the anchor expression is emitted directly.
    pub fn resolve(unit: IntervalUnit, value: u32) -> Result<Self> {
        let expression = match unit {
            IntervalUnit::Minutes if value > 59 => "0 0 * * * *".to_string(),
            IntervalUnit::Minutes => format!("0 */{value} * * * *"),
            IntervalUnit::Hours if value > 23 => "0 0 0 * * *".to_string(),
            IntervalUnit::Hours => format!("0 0 */{value} * * *"),
        };
        Self::parse(&expression)
    }

    /// Parse a raw cron expression in the 6-field dialect.
    pub fn parse(expression: &str) -> Result<Self> {
        let schedule =
            Schedule::from_str(expression).map_err(|e| SchedulerError::InvalidSchedule {
                expression: expression.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            schedule,
            expression: expression.to_string(),
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First occurrence strictly after `from`.
    pub fn next_after(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&from).next()
    }

    /// First occurrence strictly after now.
    pub fn upcoming(&self) -> Option<DateTime<Utc>> {
        self.schedule.upcoming(Utc).next()
    }
}
