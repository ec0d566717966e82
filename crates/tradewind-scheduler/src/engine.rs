use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::schedule::ScheduleSpec;

type FiringFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type FiringCallback = Arc<dyn Fn() -> FiringFuture + Send + Sync>;

/// Opaque identifier for a registered recurring schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerHandle(Uuid);

impl std::fmt::Display for TriggerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct TriggerEntry {
    spec: ScheduleSpec,
    callback: FiringCallback,
    next_fire: Option<DateTime<Utc>>,
    /// Set while a firing for this entry is executing. A due tick that finds
    /// the flag raised skips the dispatch instead of queueing it.
    in_flight: Arc<AtomicBool>,
}

/// Drives registered schedules at one-second precision.
///
/// One coordinating loop ([`TriggerEngine::run`]) polls every second and
/// spawns each due firing as its own Tokio task, so firings of different
/// handles run concurrently while firings of the same handle never overlap.
/// Pausing the engine suppresses dispatch but keeps every entry and its
/// next-fire computation alive.
pub struct TriggerEngine {
    entries: Mutex<HashMap<TriggerHandle, TriggerEntry>>,
    running: AtomicBool,
}

impl TriggerEngine {
    /// Create an engine in the paused state. Call [`start`](Self::start)
    /// once the surrounding resources (shared HTTP client) exist.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            running: AtomicBool::new(false),
        }
    }

    /// Register a recurring callback. The first firing is the schedule's
    /// next occurrence after now.
    pub fn schedule<F, Fut>(&self, spec: ScheduleSpec, callback: F) -> TriggerHandle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = TriggerHandle(Uuid::new_v4());
        let next_fire = spec.upcoming();
        let entry = TriggerEntry {
            spec,
            callback: Arc::new(move || -> FiringFuture { Box::pin(callback()) }),
            next_fire,
            in_flight: Arc::new(AtomicBool::new(false)),
        };
        let mut entries = self.entries.lock().unwrap();
        debug!(handle = %handle, next = ?next_fire, "schedule registered");
        entries.insert(handle, entry);
        handle
    }

    /// Drop a schedule. A firing already in flight completes, but nothing
    /// further is dispatched. Cancelling an unknown handle is a no-op.
    pub fn cancel(&self, handle: TriggerHandle) {
        let mut entries = self.entries.lock().unwrap();
        if entries.remove(&handle).is_some() {
            debug!(handle = %handle, "schedule cancelled");
        }
    }

    /// Next planned firing for a handle, if it is still registered and the
    /// schedule has a future occurrence.
    pub fn next_fire_time(&self, handle: TriggerHandle) -> Option<DateTime<Utc>> {
        let entries = self.entries.lock().unwrap();
        entries.get(&handle).and_then(|e| e.next_fire)
    }

    /// Number of live schedules.
    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Resume dispatching. Idempotent.
    pub fn start(&self) {
        if !self.running.swap(true, Ordering::SeqCst) {
            info!("trigger engine started");
        }
    }

    /// Suspend dispatching without touching registered schedules. Idempotent.
    pub fn pause(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("trigger engine paused");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Main event loop. Polls every second until `shutdown` broadcasts `true`.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!("trigger engine loop started");
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick(Utc::now());
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("trigger engine shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Dispatch every entry due at `now` and advance its next-fire time.
    ///
    /// Next-fire times advance even while paused, so a later resume fires at
    /// the schedule's own cadence instead of replaying missed occurrences.
    fn tick(&self, now: DateTime<Utc>) {
        let dispatching = self.running.load(Ordering::SeqCst);
        let mut due: Vec<(TriggerHandle, FiringCallback, Arc<AtomicBool>)> = Vec::new();

        {
            let mut entries = self.entries.lock().unwrap();
            for (handle, entry) in entries.iter_mut() {
                let Some(next) = entry.next_fire else { continue };
                if next > now {
                    continue;
                }
                entry.next_fire = entry.spec.next_after(now);
                if dispatching {
                    due.push((*handle, entry.callback.clone(), entry.in_flight.clone()));
                }
            }
        }

        for (handle, callback, in_flight) in due {
            if in_flight
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                warn!(handle = %handle, "previous firing still running, skipping this occurrence");
                continue;
            }
            tokio::spawn(async move {
                // Reset through a guard so a panicking firing cannot wedge
                // the entry in the in-flight state.
                let _guard = InFlightGuard(in_flight);
                callback().await;
            });
        }
    }
}

impl Default for TriggerEngine {
    fn default() -> Self {
        Self::new()
    }
}

struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    fn every_second() -> ScheduleSpec {
        ScheduleSpec::parse("* * * * * *").unwrap()
    }

    fn spawn_engine(engine: &Arc<TriggerEngine>) -> watch::Sender<bool> {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(engine.clone().run(rx));
        tx
    }

    fn count_firings(engine: &TriggerEngine, counter: &Arc<AtomicU32>) -> TriggerHandle {
        let counter = counter.clone();
        engine.schedule(every_second(), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[tokio::test]
    async fn due_schedules_fire_repeatedly() {
        let engine = Arc::new(TriggerEngine::new());
        let count = Arc::new(AtomicU32::new(0));
        count_firings(&engine, &count);
        engine.start();
        let shutdown = spawn_engine(&engine);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(count.load(Ordering::SeqCst) >= 2);
        let _ = shutdown.send(true);
    }

    #[tokio::test]
    async fn cancel_stops_future_firings() {
        let engine = Arc::new(TriggerEngine::new());
        let count = Arc::new(AtomicU32::new(0));
        let handle = count_firings(&engine, &count);
        engine.start();
        let shutdown = spawn_engine(&engine);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        engine.cancel(handle);
        let seen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
        assert_eq!(engine.entry_count(), 0);
        let _ = shutdown.send(true);
    }

    #[tokio::test]
    async fn cancel_is_idempotent_for_unknown_handles() {
        let engine = TriggerEngine::new();
        let handle = engine.schedule(every_second(), || async {});
        engine.cancel(handle);
        engine.cancel(handle);
        assert!(engine.next_fire_time(handle).is_none());
    }

    #[tokio::test]
    async fn pause_suppresses_dispatch_and_resume_restores_it() {
        let engine = Arc::new(TriggerEngine::new());
        let count = Arc::new(AtomicU32::new(0));
        let handle = count_firings(&engine, &count);
        engine.start();
        let shutdown = spawn_engine(&engine);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        engine.pause();
        let seen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
        // The handle and its next-fire computation survive the pause.
        assert!(engine.next_fire_time(handle).is_some());

        engine.start();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(count.load(Ordering::SeqCst) > seen);
        let _ = shutdown.send(true);
    }

    #[tokio::test]
    async fn same_handle_firings_never_overlap() {
        let engine = Arc::new(TriggerEngine::new());
        let entered = Arc::new(AtomicU32::new(0));
        let entered_cb = entered.clone();
        engine.schedule(every_second(), move || {
            let entered = entered_cb.clone();
            async move {
                entered.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
        });
        engine.start();
        let shutdown = spawn_engine(&engine);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        // Later occurrences are skipped while the first is still executing.
        assert_eq!(entered.load(Ordering::SeqCst), 1);
        let _ = shutdown.send(true);
    }

    #[tokio::test]
    async fn a_panicking_firing_does_not_stop_other_schedules() {
        let engine = Arc::new(TriggerEngine::new());
        let healthy = Arc::new(AtomicU32::new(0));
        let panicking = Arc::new(AtomicU32::new(0));

        let panicking_cb = panicking.clone();
        engine.schedule(every_second(), move || {
            let panicking = panicking_cb.clone();
            async move {
                panicking.fetch_add(1, Ordering::SeqCst);
                panic!("intentional failure");
            }
        });
        count_firings(&engine, &healthy);
        engine.start();
        let shutdown = spawn_engine(&engine);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(healthy.load(Ordering::SeqCst) >= 2);
        // The panicking entry keeps being dispatched too: the in-flight
        // flag is released even when the firing unwinds.
        assert!(panicking.load(Ordering::SeqCst) >= 2);
        let _ = shutdown.send(true);
    }

    #[tokio::test]
    async fn start_and_pause_are_idempotent() {
        let engine = TriggerEngine::new();
        assert!(!engine.is_running());
        engine.start();
        engine.start();
        assert!(engine.is_running());
        engine.pause();
        engine.pause();
        assert!(!engine.is_running());
    }

    #[tokio::test]
    async fn next_fire_time_is_in_the_future() {
        let engine = TriggerEngine::new();
        let handle = engine.schedule(every_second(), || async {});
        let next = engine.next_fire_time(handle).unwrap();
        assert!(next > Utc::now() - chrono::Duration::seconds(1));
    }
}
