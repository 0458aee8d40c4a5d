// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `dagrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagrun",
    version,
    about = "Run declared task DAGs in dependency order with bounded concurrency.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGRUN_LOG`, the config `[log].level`, or `info` is used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Execute the DAG declared in the configuration file.
    Run {
        /// Path or name of the config file (TOML).
        ///
        /// A bare name is searched upward from the current directory.
        #[arg(long, value_name = "PATH", default_value = "dagrun.toml")]
        config: String,

        /// Maximum number of tasks that may run concurrently.
        #[arg(long, value_name = "N", default_value_t = 1)]
        max_workers: usize,
    },

    /// Parse + validate the config, print the DAG, but don't execute anything.
    Check {
        /// Path or name of the config file (TOML).
        #[arg(long, value_name = "PATH", default_value = "dagrun.toml")]
        config: String,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
