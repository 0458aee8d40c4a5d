// src/logging.rs

//! Logging setup for `dagrun` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `DAGRUN_LOG` environment variable (e.g. "info", "debug")
//! 3. `[log].level` from the config file
//! 4. default to `info`
//!
//! Logs always go to stderr so that task stdout stays clean; when
//! `[log].file` is set, a second non-ANSI layer writes to that file through
//! a non-blocking `tracing-appender` writer, rotated per `[log].rotation`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::LogLevel;
use crate::config::model::{LogRotation, LogSection};

/// Initialise the global logging subscriber.
///
/// Returns the appender worker guard when file logging is enabled; the
/// caller must keep it alive for the duration of the run so buffered lines
/// are flushed on exit.
pub fn init_logging(cli_level: Option<LogLevel>, log_cfg: &LogSection) -> Result<Option<WorkerGuard>> {
    let level = resolve_level(cli_level, log_cfg);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match &log_cfg.file {
        Some(path) => {
            let (writer, guard) = file_writer(path, log_cfg.rotation)?;
            let layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn resolve_level(cli_level: Option<LogLevel>, log_cfg: &LogSection) -> tracing::Level {
    if let Some(lvl) = cli_level {
        return level_from_log_level(lvl);
    }

    if let Some(lvl) = std::env::var("DAGRUN_LOG").ok().and_then(|s| parse_level_str(&s)) {
        return lvl;
    }

    log_cfg
        .level
        .as_deref()
        .and_then(parse_level_str)
        .unwrap_or(tracing::Level::INFO)
}

fn file_writer(
    path: &Path,
    rotation: LogRotation,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    let file_name = path
        .file_name()
        .with_context(|| format!("invalid log file path '{}'", path.display()))?;

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory '{}'", dir.display()))?;

    let appender = match rotation {
        LogRotation::Never => tracing_appender::rolling::never(&dir, file_name),
        LogRotation::Hourly => tracing_appender::rolling::hourly(&dir, file_name),
        LogRotation::Daily => tracing_appender::rolling::daily(&dir, file_name),
    };

    Ok(tracing_appender::non_blocking(appender))
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
