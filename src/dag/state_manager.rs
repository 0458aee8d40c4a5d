// src/dag/state_manager.rs

//! Per-run state transitions for tasks in the scheduler core.

use tracing::{debug, info, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::task_state::TaskState;

/// Applies state transitions over the execution-state vector.
///
/// All mutation of task states goes through this type, called only from the
/// core engine's single-threaded step function. Tasks are indexed by
/// declaration order, which is also the admission tie-break order.
pub struct StateManager<'a> {
    graph: &'a TaskGraph,
    states: &'a mut [TaskState],
}

impl<'a> StateManager<'a> {
    pub fn new(graph: &'a TaskGraph, states: &'a mut [TaskState]) -> Self {
        Self { graph, states }
    }

    /// Whether every dependency of `idx` has succeeded.
    pub fn deps_satisfied(&self, idx: usize) -> bool {
        self.graph
            .dependencies_of(idx)
            .iter()
            .all(|&dep| self.states[dep] == TaskState::Succeeded)
    }

    /// Move `Pending` tasks whose dependencies are all `Succeeded` to `Ready`.
    pub fn promote_ready(&mut self) {
        for idx in 0..self.states.len() {
            if self.states[idx] == TaskState::Pending && self.deps_satisfied(idx) {
                self.states[idx] = TaskState::Ready;
                debug!(task = %self.graph.name_of(idx), "dependencies satisfied; task is ready");
            }
        }
    }

    /// Admit up to `capacity` ready tasks, preferring lower declaration
    /// index, and mark them `Running`. Returns the admitted indices in
    /// admission order.
    pub fn admit(&mut self, capacity: usize) -> Vec<usize> {
        let mut admitted = Vec::new();

        for idx in 0..self.states.len() {
            if admitted.len() == capacity {
                break;
            }
            if self.states[idx] == TaskState::Ready {
                self.states[idx] = TaskState::Running;
                info!(task = %self.graph.name_of(idx), "dispatching task");
                admitted.push(idx);
            }
        }

        admitted
    }

    /// Record a successful completion.
    pub fn apply_success(&mut self, idx: usize) {
        if self.states[idx] != TaskState::Running {
            warn!(
                task = %self.graph.name_of(idx),
                state = %self.states[idx],
                "completion for a task that was not running"
            );
        }
        self.states[idx] = TaskState::Succeeded;
        debug!(task = %self.graph.name_of(idx), "task completed successfully");
    }

    /// Record a failed completion. Dependents are skipped separately via
    /// [`StateManager::skip_dependents`].
    pub fn apply_failure(&mut self, idx: usize) {
        if self.states[idx] != TaskState::Running {
            warn!(
                task = %self.graph.name_of(idx),
                state = %self.states[idx],
                "failure for a task that was not running"
            );
        }
        self.states[idx] = TaskState::Failed;
    }

    /// Mark all transitive dependents of `idx` that have not yet run as
    /// `Skipped`. Returns the newly skipped indices.
    pub fn skip_dependents(&mut self, idx: usize) -> Vec<usize> {
        let mut stack: Vec<usize> = self.graph.dependents_of(idx).to_vec();
        let mut skipped = Vec::new();

        while let Some(node) = stack.pop() {
            match self.states[node] {
                TaskState::Pending | TaskState::Ready => {
                    self.states[node] = TaskState::Skipped;
                    warn!(
                        task = %self.graph.name_of(node),
                        "skipping task due to upstream failure"
                    );
                    skipped.push(node);
                    stack.extend_from_slice(self.graph.dependents_of(node));
                }
                // Already terminal, or running to completion; a running task
                // is never preempted when a sibling fails.
                _ => {}
            }
        }

        skipped
    }

    pub fn running_count(&self) -> usize {
        self.states
            .iter()
            .filter(|&&s| s == TaskState::Running)
            .count()
    }

    pub fn all_terminal(&self) -> bool {
        self.states.iter().all(|s| s.is_terminal())
    }
}
