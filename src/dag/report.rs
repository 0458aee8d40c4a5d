// src/dag/report.rs

//! Final structured outcome of one scheduling run.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::task_state::TaskState;
use crate::engine::TaskName;

/// Overall status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    AllSucceeded,
    PartialFailure,
    /// The DAG never passed validation; zero tasks were executed.
    ValidationFailed,
}

/// Terminal state of a single task, plus an optional error detail.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub state: TaskState,
    pub detail: Option<String>,
}

/// Final description of what happened during a run.
///
/// Every declared task has an entry, even under `PartialFailure`. For
/// `ValidationFailed` the task map is empty and `validation_error` carries
/// the failure description.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub status: RunStatus,
    pub tasks: BTreeMap<TaskName, TaskReport>,
    pub validation_error: Option<String>,
}

impl RunReport {
    pub fn validation_failed(detail: String) -> Self {
        Self {
            status: RunStatus::ValidationFailed,
            tasks: BTreeMap::new(),
            validation_error: Some(detail),
        }
    }

    pub(crate) fn from_run(
        graph: &TaskGraph,
        states: &[TaskState],
        details: &[Option<String>],
    ) -> Self {
        let mut tasks = BTreeMap::new();
        let mut all_succeeded = true;

        for (idx, &state) in states.iter().enumerate() {
            if state != TaskState::Succeeded {
                all_succeeded = false;
            }
            tasks.insert(
                graph.name_of(idx).to_string(),
                TaskReport {
                    state,
                    detail: details[idx].clone(),
                },
            );
        }

        let status = if all_succeeded {
            RunStatus::AllSucceeded
        } else {
            RunStatus::PartialFailure
        };

        Self {
            status,
            tasks,
            validation_error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::AllSucceeded
    }

    pub fn state_of(&self, name: &str) -> Option<TaskState> {
        self.tasks.get(name).map(|t| t.state)
    }

    /// Log one line per task plus the overall status.
    pub fn log_summary(&self) {
        for (name, task) in &self.tasks {
            match task.state {
                TaskState::Succeeded => {
                    info!(task = %name, state = %task.state, "task summary");
                }
                _ => {
                    warn!(
                        task = %name,
                        state = %task.state,
                        detail = task.detail.as_deref().unwrap_or(""),
                        "task summary"
                    );
                }
            }
        }

        match self.status {
            RunStatus::AllSucceeded => info!("run finished: all tasks succeeded"),
            RunStatus::PartialFailure => warn!("run finished with failures"),
            RunStatus::ValidationFailed => warn!(
                error = self.validation_error.as_deref().unwrap_or(""),
                "run aborted: DAG validation failed"
            ),
        }
    }
}
