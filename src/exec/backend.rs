// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of spawning work
//! directly. This makes it easy to swap in a fake executor in tests while
//! keeping the production Tokio implementation here.
//!
//! - `TokioExecutorBackend` is the default implementation used by `dagrun`.
//!   Each task runs on its own Tokio task; the worker bound is enforced by
//!   the core engine, which only dispatches while a slot is free.
//! - Tests can provide their own `ExecutorBackend` that records which tasks
//!   were dispatched and directly emits `TaskFinished` events.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::{EngineEvent, TaskName};
use crate::errors::Result;
use crate::exec::runnable::Runnable;

/// Trait abstracting how a dispatched task is executed.
pub trait ExecutorBackend: Send {
    /// Start executing a single task's runnable.
    ///
    /// The implementation must eventually deliver a
    /// [`EngineEvent::TaskFinished`] for the task, and must not block the
    /// caller for the duration of the runnable.
    fn spawn_task(
        &mut self,
        task: TaskName,
        runnable: Arc<dyn Runnable>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real executor backend used in production.
///
/// Spawns one Tokio task per dispatched DAG task and reports the runnable's
/// outcome back to the runtime over the engine event channel.
pub struct TokioExecutorBackend {
    event_tx: mpsc::Sender<EngineEvent>,
}

impl TokioExecutorBackend {
    pub fn new(event_tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { event_tx }
    }
}

impl ExecutorBackend for TokioExecutorBackend {
    fn spawn_task(
        &mut self,
        task: TaskName,
        runnable: Arc<dyn Runnable>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.event_tx.clone();

        Box::pin(async move {
            tokio::spawn(async move {
                let outcome = runnable.execute().await;

                if tx
                    .send(EngineEvent::TaskFinished {
                        task: task.clone(),
                        outcome,
                    })
                    .await
                    .is_err()
                {
                    debug!(
                        task = %task,
                        "engine receiver dropped before completion could be delivered"
                    );
                }
            });

            Ok(())
        })
    }
}
