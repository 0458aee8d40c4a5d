// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DagrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Duplicate task '{0}' in DAG declaration")]
    DuplicateTask(String),

    #[error("Task '{task}' has unknown dependency '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("Cycle detected in task DAG: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DagrunError {
    /// Whether this error belongs to the DAG validation taxonomy.
    ///
    /// Validation errors short-circuit a run into a `ValidationFailed` report
    /// with zero tasks executed; everything else propagates to the caller.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DagrunError::DuplicateTask(_)
                | DagrunError::UnknownDependency { .. }
                | DagrunError::Cycle { .. }
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DagrunError>;
