// src/engine/core.rs

//! Pure core scheduling state machine.
//!
//! This module contains a synchronous, deterministic "core engine" that
//! consumes [`EngineEvent`]s and produces:
//! - an updated execution-state vector
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading completion events from the channel
//! - dispatching admitted tasks to the executor
//! - calling the logging sink
//!
//! The core is the single point of serialization for execution state: it is
//! stepped from one place, so concurrent completions can never race on state
//! transitions or readiness decisions. It is intended to be extensively unit
//! tested without any Tokio, channels or processes.

use tracing::{debug, warn};

use crate::dag::{RunReport, StateManager, TaskGraph, TaskState};
use crate::engine::{EngineEvent, TaskName, TaskOutcome};
use crate::errors::{DagrunError, Result};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Send these tasks to the executor, in the given order.
    Dispatch(Vec<TaskName>),
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep waiting for events.
    pub keep_running: bool,
}

/// Owns the validated graph plus all mutable per-run state.
#[derive(Debug)]
pub struct CoreEngine {
    graph: TaskGraph,
    states: Vec<TaskState>,
    details: Vec<Option<String>>,
    max_workers: usize,
}

impl CoreEngine {
    /// Create an engine for one run over `graph` with a bounded worker pool.
    ///
    /// Rejects `max_workers == 0` instead of clamping it.
    pub fn new(graph: TaskGraph, max_workers: usize) -> Result<Self> {
        if max_workers == 0 {
            return Err(DagrunError::ConfigError(
                "max_workers must be >= 1 (got 0)".to_string(),
            ));
        }

        let len = graph.len();
        Ok(Self {
            graph,
            states: vec![TaskState::Pending; len],
            details: vec![None; len],
            max_workers,
        })
    }

    /// Begin the run: admit the initial batch of root tasks.
    pub fn start(&mut self) -> CoreStep {
        let mut manager = StateManager::new(&self.graph, &mut self.states);
        manager.promote_ready();
        let admitted = manager.admit(self.max_workers);
        self.step_result(admitted)
    }

    /// Handle a single engine event, updating state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: EngineEvent) -> CoreStep {
        match event {
            EngineEvent::TaskFinished { task, outcome } => self.handle_finished(task, outcome),
        }
    }

    fn handle_finished(&mut self, task: TaskName, outcome: TaskOutcome) -> CoreStep {
        let Some(idx) = self.graph.index_of(&task) else {
            warn!(task = %task, "completion for unknown task; ignoring");
            return self.step_result(Vec::new());
        };

        let mut manager = StateManager::new(&self.graph, &mut self.states);

        match outcome {
            TaskOutcome::Success => {
                manager.apply_success(idx);
            }
            TaskOutcome::Failed(detail) => {
                manager.apply_failure(idx);
                let skipped = manager.skip_dependents(idx);

                self.details[idx] = Some(detail);
                for s in skipped {
                    self.details[s] =
                        Some(format!("upstream dependency '{task}' did not succeed"));
                }
            }
        }

        let mut manager = StateManager::new(&self.graph, &mut self.states);
        manager.promote_ready();
        let capacity = self.max_workers - manager.running_count();
        let admitted = manager.admit(capacity);

        self.step_result(admitted)
    }

    fn step_result(&self, admitted: Vec<usize>) -> CoreStep {
        let mut commands = Vec::new();

        if !admitted.is_empty() {
            let names: Vec<TaskName> = admitted
                .iter()
                .map(|&i| self.graph.name_of(i).to_string())
                .collect();
            commands.push(CoreCommand::Dispatch(names));
        }

        let keep_running = !self.is_complete();

        if !keep_running {
            debug!("all tasks terminal; run is complete");
        }

        CoreStep {
            commands,
            keep_running,
        }
    }

    /// Number of tasks currently in the `Running` state.
    pub fn running_count(&self) -> usize {
        self.states
            .iter()
            .filter(|&&s| s == TaskState::Running)
            .count()
    }

    /// Whether every task has reached a terminal state.
    pub fn is_complete(&self) -> bool {
        self.states.iter().all(|s| s.is_terminal())
    }

    /// Current state of a task, if it exists.
    pub fn state_of(&self, task: &str) -> Option<TaskState> {
        self.graph.index_of(task).map(|i| self.states[i])
    }

    /// Consume the engine into the final run report.
    pub fn into_report(self) -> RunReport {
        RunReport::from_run(&self.graph, &self.states, &self.details)
    }
}
