use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use dagrun::engine::{EngineEvent, TaskName, TaskOutcome};
use dagrun::errors::Result;
use dagrun::exec::{ExecutorBackend, Runnable};

/// A fake executor that:
/// - records which tasks were dispatched, in dispatch order
/// - immediately reports `TaskFinished` for each one, failing the tasks in
///   the configured failure set instead of invoking any runnable.
pub struct FakeExecutor {
    event_tx: mpsc::Sender<EngineEvent>,
    executed: Arc<Mutex<Vec<String>>>,
    failing: HashSet<String>,
}

impl FakeExecutor {
    pub fn new(event_tx: mpsc::Sender<EngineEvent>, executed: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            event_tx,
            executed,
            failing: HashSet::new(),
        }
    }

    /// Make the named tasks report `Failed` instead of `Success`.
    pub fn with_failing<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.failing = names.into_iter().map(|s| s.to_string()).collect();
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_task(
        &mut self,
        task: TaskName,
        _runnable: Arc<dyn Runnable>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.event_tx.clone();
        let executed = Arc::clone(&self.executed);
        let outcome = if self.failing.contains(&task) {
            TaskOutcome::Failed("exit status 1".to_string())
        } else {
            TaskOutcome::Success
        };

        Box::pin(async move {
            {
                let mut guard = executed.lock().unwrap();
                guard.push(task.clone());
            }

            tx.send(EngineEvent::TaskFinished { task, outcome })
                .await
                .map_err(anyhow::Error::from)?;
            Ok(())
        })
    }
}
