// src/exec/runnable.rs

//! The runnable capability: what a task actually does when it runs.
//!
//! The engine never inspects a runnable's contents; it only invokes it and
//! observes the resulting [`TaskOutcome`]. Tests substitute deterministic
//! fakes (always-succeed, always-fail, artificially slow) without touching
//! the scheduler.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::engine::{TaskName, TaskOutcome};

/// A unit of work owned by a task.
///
/// A runnable's failure is data, not a propagated fault: `execute` always
/// resolves to an outcome, and spawn or wait errors are folded into
/// [`TaskOutcome::Failed`] with a detail message.
pub trait Runnable: Send + Sync {
    fn execute(&self) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + '_>>;
}

/// Production runnable: executes a shell command via `tokio::process`.
#[derive(Debug, Clone)]
pub struct ShellRunnable {
    name: TaskName,
    cmd: String,
}

impl ShellRunnable {
    pub fn new(name: impl Into<TaskName>, cmd: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
        }
    }
}

impl Runnable for ShellRunnable {
    fn execute(&self) -> Pin<Box<dyn Future<Output = TaskOutcome> + Send + '_>> {
        Box::pin(async move { run_shell_command(&self.name, &self.cmd).await })
    }
}

async fn run_shell_command(name: &str, cmd: &str) -> TaskOutcome {
    info!(task = %name, cmd = %cmd, "starting task process");

    // Build a shell command appropriate for the platform.
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            return TaskOutcome::Failed(format!("spawning process: {err}"));
        }
    };

    // Stream both pipes at debug level so buffers never fill up.
    if let Some(stdout) = child.stdout.take() {
        let task_name = name.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stdout: {}", line);
            }
        });
    }

    if let Some(stderr) = child.stderr.take() {
        let task_name = name.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stderr: {}", line);
            }
        });
    }

    let status = match child.wait().await {
        Ok(status) => status,
        Err(err) => {
            return TaskOutcome::Failed(format!("waiting for process: {err}"));
        }
    };

    let code = status.code().unwrap_or(-1);
    info!(
        task = %name,
        exit_code = code,
        success = status.success(),
        "task process exited"
    );

    if status.success() {
        TaskOutcome::Success
    } else {
        TaskOutcome::Failed(format!("process exited with status {code}"))
    }
}
