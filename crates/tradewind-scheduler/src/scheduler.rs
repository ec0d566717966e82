use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use tradewind_core::config::SchedulerConfig;
use tradewind_core::AnalysisTarget;

use crate::engine::{TriggerEngine, TriggerHandle};
use crate::error::{Result, SchedulerError};
use crate::executor::{AnalysisExecutor, SharedConnection};
use crate::schedule::ScheduleSpec;
use crate::types::{IntervalUnit, JobDefinition, JobView};

const DEFAULT_MINUTES: u32 = 20;
const DEFAULT_HOURS: u32 = 1;
const MAX_MINUTES: u32 = 59;
const MAX_HOURS: u32 = 23;

struct JobRecord {
    definition: JobDefinition,
    handle: TriggerHandle,
}

/// Registry and lifecycle for recurring trade-analysis jobs.
///
/// Wires the trigger engine to the HTTP executor: each registered job gets a
/// callback that posts its analysis target downstream, and the job map keeps
/// the definition around so intervals can be inspected and updated later.
pub struct TradingScheduler {
    engine: Arc<TriggerEngine>,
    executor: Arc<AnalysisExecutor>,
    connection: SharedConnection,
    jobs: Mutex<HashMap<String, JobRecord>>,
    request_timeout: Duration,
}

impl TradingScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        let connection: SharedConnection = Arc::new(RwLock::new(None));
        let executor = Arc::new(AnalysisExecutor::new(config.base_url, connection.clone()));
        Self {
            engine: Arc::new(TriggerEngine::new()),
            executor,
            connection,
            jobs: Mutex::new(HashMap::new()),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// Register a recurring job, replacing any existing job with the same id.
    ///
    /// The replacement swaps the old trigger out before the new one goes in,
    /// so a re-added job never fires on both schedules.
    pub fn add_job(
        &self,
        id: &str,
        target: AnalysisTarget,
        interval_value: u32,
        interval_unit: IntervalUnit,
    ) -> Result<JobView> {
        let value = Self::normalize_interval(interval_value, interval_unit)?;
        let spec = ScheduleSpec::resolve(interval_unit, value)?;
        let expression = spec.expression().to_string();
        let definition = JobDefinition {
            id: id.to_string(),
            target,
            interval_value: value,
            interval_unit,
        };

        let mut jobs = self.jobs.lock().unwrap();
        let replaced = jobs.contains_key(id);
        let view = self.install(&mut jobs, definition, spec);
        if replaced {
            info!(job_id = %id, symbol = %view.symbol, schedule = %expression, "trading job replaced");
        } else {
            info!(job_id = %id, symbol = %view.symbol, schedule = %expression, "trading job added");
        }
        Ok(view)
    }

    /// Remove a job. Returns whether anything was actually removed; removing
    /// an unknown id is a no-op.
    pub fn remove_job(&self, id: &str) -> bool {
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.remove(id) {
            Some(record) => {
                self.engine.cancel(record.handle);
                info!(job_id = %id, "trading job removed");
                true
            }
            None => false,
        }
    }

    /// Reschedule an existing job onto a new interval value, keeping its
    /// unit and analysis target. The old schedule stays in place if the new
    /// value fails validation.
    pub fn update_interval(&self, id: &str, new_value: u32) -> Result<JobView> {
        let mut jobs = self.jobs.lock().unwrap();
        let Some(record) = jobs.get(id) else {
            return Err(SchedulerError::JobNotFound { id: id.to_string() });
        };

        let unit = record.definition.interval_unit;
        let value = Self::normalize_interval(new_value, unit)?;
        let spec = ScheduleSpec::resolve(unit, value)?;
        let expression = spec.expression().to_string();

        let mut definition = record.definition.clone();
        definition.interval_value = value;

        let view = self.install(&mut jobs, definition, spec);
        info!(job_id = %id, schedule = %expression, "trading job interval updated");
        Ok(view)
    }

    /// Snapshot of every registered job, keyed by job id.
    pub fn list_status(&self) -> BTreeMap<String, JobView> {
        let jobs = self.jobs.lock().unwrap();
        jobs.iter()
            .map(|(id, record)| {
                let view = JobView {
                    symbol: record.definition.target.symbol.to_string(),
                    interval_value: record.definition.interval_value,
                    interval_unit: record.definition.interval_unit,
                    next_fire_time: self.engine.next_fire_time(record.handle),
                };
                (id.clone(), view)
            })
            .collect()
    }

    /// Open the shared HTTP client and let triggers dispatch. Safe to call
    /// repeatedly; an already-open client is reused.
    pub fn start(&self) -> Result<()> {
        {
            let mut slot = self.connection.write().unwrap();
            if slot.is_none() {
                let client = reqwest::Client::builder()
                    .timeout(self.request_timeout)
                    .build()?;
                *slot = Some(client);
            }
        }
        self.engine.start();
        info!("trading scheduler started");
        Ok(())
    }

    /// Pause dispatch and drop the shared HTTP client. Jobs and their
    /// schedules stay registered; firings already running finish on their
    /// own clone of the client.
    pub fn stop(&self) {
        self.engine.pause();
        {
            let mut slot = self.connection.write().unwrap();
            *slot = None;
        }
        info!("trading scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    /// Drive the trigger loop until `shutdown` flips to true.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) {
        self.engine.clone().run(shutdown).await;
    }

    fn install(
        &self,
        jobs: &mut HashMap<String, JobRecord>,
        definition: JobDefinition,
        spec: ScheduleSpec,
    ) -> JobView {
        if let Some(old) = jobs.remove(&definition.id) {
            self.engine.cancel(old.handle);
        }

        let executor = self.executor.clone();
        let job_id = definition.id.clone();
        let target = definition.target.clone();
        let handle = self.engine.schedule(spec, move || {
            let executor = executor.clone();
            let job_id = job_id.clone();
            let target = target.clone();
            async move {
                if let Err(error) = executor.execute(&job_id, &target).await {
                    error!(job_id = %job_id, error = %error, "trade analysis firing failed");
                }
            }
        });

        let view = JobView {
            symbol: definition.target.symbol.to_string(),
            interval_value: definition.interval_value,
            interval_unit: definition.interval_unit,
            next_fire_time: self.engine.next_fire_time(handle),
        };
        jobs.insert(definition.id.clone(), JobRecord { definition, handle });
        view
    }

    fn normalize_interval(value: u32, unit: IntervalUnit) -> Result<u32> {
        if value == 0 {
            return Err(SchedulerError::InvalidInterval(format!(
                "interval must be at least 1 {unit}"
            )));
        }
        let max = match unit {
            IntervalUnit::Minutes => MAX_MINUTES,
            IntervalUnit::Hours => MAX_HOURS,
        };
        if value > max {
            let fallback = match unit {
                IntervalUnit::Minutes => DEFAULT_MINUTES,
                IntervalUnit::Hours => DEFAULT_HOURS,
            };
            warn!(value, unit = %unit, fallback, "interval out of range, using the default");
            return Ok(fallback);
        }
        Ok(value)
    }
}
