// src/dag/task_state.rs

//! Per-run execution state of a task.

use std::fmt;

/// State machine per task:
/// `Pending -> Ready -> Running -> {Succeeded | Failed}`, with the side
/// transition `Pending/Ready -> Skipped` when any dependency lands in
/// `Failed` or `Skipped`.
///
/// Owned exclusively by the scheduler core; task bodies never mutate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting for dependencies to finish.
    Pending,
    /// All dependencies succeeded; eligible for a worker slot.
    Ready,
    /// Dispatched to the executor and currently running.
    Running,
    /// Ran and completed successfully.
    Succeeded,
    /// Ran and failed.
    Failed,
    /// Never ran because a dependency failed or was itself skipped.
    Skipped,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::Failed | TaskState::Skipped
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "pending",
            TaskState::Ready => "ready",
            TaskState::Running => "running",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
            TaskState::Skipped => "skipped",
        };
        f.write_str(s)
    }
}
