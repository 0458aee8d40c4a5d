// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [log]
/// level = "info"
/// file = "logs/dagrun.log"
/// rotation = "daily"
///
/// [[dag.tasks]]
/// name = "extract"
/// cmd = "python scripts/extract.py"
///
/// [[dag.tasks]]
/// name = "report"
/// cmd = "python scripts/report.py"
/// dependencies = ["extract"]
/// ```
///
/// All sections are optional. A file with no `[dag]` section is valid; the
/// `run` action then reports "no DAG found" and performs zero work.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Logging setup from `[log]`.
    #[serde(default)]
    pub log: LogSection,

    /// The DAG declaration from `[dag]`, if any.
    #[serde(default)]
    pub dag: Option<DagSection>,
}

/// `[log]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogSection {
    /// Log level (error, warn, info, debug, trace). CLI flag and the
    /// `DAGRUN_LOG` env var take precedence.
    #[serde(default)]
    pub level: Option<String>,

    /// Optional log file; parent directories are created on demand.
    /// When omitted, logs go to stderr only.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Rotation policy for the log file.
    #[serde(default)]
    pub rotation: LogRotation,
}

/// Rotation policy for the `[log].file` appender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// `[dag]` section: the list of task declarations.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DagSection {
    #[serde(default)]
    pub tasks: Vec<TaskDecl>,
}

/// One `[[dag.tasks]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskDecl {
    /// Unique task name within the DAG.
    pub name: String,

    /// The shell command this task runs.
    pub cmd: String,

    /// Names of tasks that must succeed before this one may start.
    /// Omitting the field is equivalent to an empty list.
    #[serde(default)]
    pub dependencies: Vec<String>,
}
