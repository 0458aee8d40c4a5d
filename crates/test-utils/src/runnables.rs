//! Deterministic fake runnables and a recording sink for tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dagrun::engine::TaskOutcome;
use dagrun::events::EventSink;
use dagrun::exec::Runnable;

/// Runnable that immediately resolves to a fixed outcome.
pub struct StaticRunnable {
    outcome: TaskOutcome,
}

impl StaticRunnable {
    pub fn succeed() -> Arc<dyn Runnable> {
        Arc::new(Self {
            outcome: TaskOutcome::Success,
        })
    }

    pub fn fail(detail: &str) -> Arc<dyn Runnable> {
        Arc::new(Self {
            outcome: TaskOutcome::Failed(detail.to_string()),
        })
    }
}

impl Runnable for StaticRunnable {
    fn execute(&self) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + '_>> {
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

/// Shared, thread-safe log of execution markers.
#[derive(Clone, Default)]
pub struct ExecutionLog(Arc<Mutex<Vec<String>>>);

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Position of the first entry equal to `marker`, if any.
    pub fn position(&self, marker: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == marker)
    }
}

/// Runnable that records `start:<name>` / `end:<name>` markers around an
/// optional artificial delay, then resolves to the configured outcome.
pub struct RecordingRunnable {
    name: String,
    log: ExecutionLog,
    outcome: TaskOutcome,
    hold: Duration,
}

impl RecordingRunnable {
    pub fn new(name: &str, log: ExecutionLog) -> Arc<dyn Runnable> {
        Self::with_outcome(name, log, TaskOutcome::Success, Duration::ZERO)
    }

    pub fn failing(name: &str, log: ExecutionLog, detail: &str) -> Arc<dyn Runnable> {
        Self::with_outcome(
            name,
            log,
            TaskOutcome::Failed(detail.to_string()),
            Duration::ZERO,
        )
    }

    pub fn slow(name: &str, log: ExecutionLog, hold: Duration) -> Arc<dyn Runnable> {
        Self::with_outcome(name, log, TaskOutcome::Success, hold)
    }

    pub fn with_outcome(
        name: &str,
        log: ExecutionLog,
        outcome: TaskOutcome,
        hold: Duration,
    ) -> Arc<dyn Runnable> {
        Arc::new(Self {
            name: name.to_string(),
            log,
            outcome,
            hold,
        })
    }
}

impl Runnable for RecordingRunnable {
    fn execute(&self) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + '_>> {
        Box::pin(async move {
            self.log.record(format!("start:{}", self.name));
            if !self.hold.is_zero() {
                tokio::time::sleep(self.hold).await;
            }
            self.log.record(format!("end:{}", self.name));
            self.outcome.clone()
        })
    }
}

/// Tracks how many gauged runnables are executing at once, and the peak.
#[derive(Clone, Default)]
pub struct ConcurrencyGauge {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ConcurrencyGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// A succeeding runnable that holds a concurrency slot for `hold`.
    pub fn runnable(&self, hold: Duration) -> Arc<dyn Runnable> {
        Arc::new(GaugedRunnable {
            gauge: self.clone(),
            hold,
        })
    }
}

struct GaugedRunnable {
    gauge: ConcurrencyGauge,
    hold: Duration,
}

impl Runnable for GaugedRunnable {
    fn execute(&self) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + '_>> {
        Box::pin(async move {
            let now = self.gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.gauge.peak.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.hold).await;

            self.gauge.current.fetch_sub(1, Ordering::SeqCst);
            TaskOutcome::Success
        })
    }
}

/// Sink that records the exact task lifecycle event sequence.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn task_started(&self, task: &str) {
        self.events.lock().unwrap().push(format!("started:{task}"));
    }

    fn task_finished(&self, task: &str, outcome: &TaskOutcome) {
        let tag = match outcome {
            TaskOutcome::Success => "success",
            TaskOutcome::Failed(_) => "failed",
        };
        self.events
            .lock()
            .unwrap()
            .push(format!("finished:{task}:{tag}"));
    }
}
