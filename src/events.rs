// src/events.rs

//! Logging sink for task lifecycle events.
//!
//! The engine does not configure logging; it only calls the sink it was
//! handed. Production wires in [`TracingSink`]; tests inject a recording
//! sink to assert on the exact event sequence.

use tracing::{info, warn};

use crate::engine::TaskOutcome;

/// Receives discrete task lifecycle events from the runtime.
pub trait EventSink: Send {
    fn task_started(&self, task: &str);
    fn task_finished(&self, task: &str, outcome: &TaskOutcome);
}

/// Forwards task events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn task_started(&self, task: &str) {
        info!(task = %task, "task started");
    }

    fn task_finished(&self, task: &str, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Success => {
                info!(task = %task, "task finished successfully");
            }
            TaskOutcome::Failed(detail) => {
                warn!(task = %task, error = %detail, "task failed");
            }
        }
    }
}
