// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::dag::RunReport;
use crate::errors::{DagrunError, Result};
use crate::events::EventSink;
use crate::exec::{ExecutorBackend, Runnable};

use super::core::CoreEngine;
use super::{CoreCommand, CoreStep, EngineEvent};

/// Drives the core engine in response to task completion events, and
/// delegates actual task execution to an `ExecutorBackend`.
///
/// This is a pure IO shell around `CoreEngine`, which contains all the
/// scheduling semantics. This struct handles async IO: reading events from
/// the channel, dispatching admitted tasks to the executor, and emitting
/// start/finish events to the injected logging sink.
pub struct Runtime<E: ExecutorBackend, S: EventSink> {
    core: CoreEngine,
    runnables: HashMap<String, Arc<dyn Runnable>>,
    event_rx: mpsc::Receiver<EngineEvent>,
    executor: E,
    sink: S,
}

impl<E: ExecutorBackend, S: EventSink> fmt::Debug for Runtime<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend, S: EventSink> Runtime<E, S> {
    pub fn new(
        core: CoreEngine,
        runnables: HashMap<String, Arc<dyn Runnable>>,
        event_rx: mpsc::Receiver<EngineEvent>,
        executor: E,
        sink: S,
    ) -> Self {
        Self {
            core,
            runnables,
            event_rx,
            executor,
            sink,
        }
    }

    /// Main event loop.
    ///
    /// - Admits and dispatches the initial batch of root tasks.
    /// - Consumes `EngineEvent`s from `event_rx` and feeds them to the core.
    /// - Executes the commands returned by the core.
    /// - Returns the run report once every task is terminal.
    pub async fn run(mut self) -> Result<RunReport> {
        info!("dagrun engine started");

        let step = self.core.start();
        let mut keep_running = self.apply_step(step).await?;

        while keep_running {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("engine event channel closed; stopping");
                    break;
                }
            };

            debug!(?event, "engine received event");

            let EngineEvent::TaskFinished { task, outcome } = &event;
            self.sink.task_finished(task, outcome);

            let step = self.core.step(event);
            keep_running = self.apply_step(step).await?;
        }

        info!("engine finished");
        Ok(self.core.into_report())
    }

    async fn apply_step(&mut self, step: CoreStep) -> Result<bool> {
        for command in step.commands {
            match command {
                CoreCommand::Dispatch(tasks) => self.dispatch(tasks).await?,
            }
        }
        Ok(step.keep_running)
    }

    async fn dispatch(&mut self, tasks: Vec<String>) -> Result<()> {
        for name in tasks {
            let runnable = self
                .runnables
                .get(&name)
                .cloned()
                .ok_or_else(|| DagrunError::TaskNotFound(name.clone()))?;

            self.sink.task_started(&name);
            self.executor.spawn_task(name, runnable).await?;
        }
        Ok(())
    }
}
