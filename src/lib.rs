// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod events;
pub mod exec;
pub mod logging;

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cli::{CliArgs, Command};
use crate::config::loader::discover_and_load;
use crate::config::model::DagSection;
use crate::dag::{RunReport, TaskGraph, TaskRegistry};
use crate::engine::{CoreEngine, EngineEvent, Runtime};
use crate::errors::Result;
use crate::events::TracingSink;
use crate::exec::TokioExecutorBackend;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config discovery + loading
/// - logging
/// - registry / graph builder / engine
/// - executor
///
/// Returns `None` when nothing was executed and nothing failed (no `dag`
/// section, or a clean `check`); otherwise the run report. Validation
/// failures surface as a `ValidationFailed` report with zero tasks executed.
pub async fn run(args: CliArgs) -> Result<Option<RunReport>> {
    match args.command {
        Command::Run {
            config,
            max_workers,
        } => {
            let (path, cfg) = discover_and_load(&config)?;
            let _log_guard = logging::init_logging(args.log_level, &cfg.log)?;
            info!(config = %path.display(), "loaded configuration");

            let Some(dag) = cfg.dag else {
                println!("No DAG found in the configuration file.");
                return Ok(None);
            };

            execute_dag(&dag, max_workers).await
        }

        Command::Check { config } => {
            let (path, cfg) = discover_and_load(&config)?;
            let _log_guard = logging::init_logging(args.log_level, &cfg.log)?;
            info!(config = %path.display(), "loaded configuration");

            let Some(dag) = cfg.dag else {
                println!("No DAG found in the configuration file.");
                return Ok(None);
            };

            match prepare(&dag) {
                Ok((_registry, graph)) => {
                    print_plan(&dag, &graph);
                    Ok(None)
                }
                Err(err) if err.is_validation() => {
                    error!(error = %err, "DAG validation failed");
                    Ok(Some(RunReport::validation_failed(err.to_string())))
                }
                Err(err) => Err(err),
            }
        }
    }
}

/// Build the registry and the validated graph from a `[dag]` section.
fn prepare(dag: &DagSection) -> Result<(TaskRegistry, TaskGraph)> {
    let registry = TaskRegistry::from_config(dag)?;
    let graph = TaskGraph::build(&registry)?;
    Ok((registry, graph))
}

/// Validate and execute the DAG with a bounded worker pool.
async fn execute_dag(dag: &DagSection, max_workers: usize) -> Result<Option<RunReport>> {
    let (registry, graph) = match prepare(dag) {
        Ok(v) => v,
        Err(err) if err.is_validation() => {
            error!(error = %err, "DAG validation failed; no tasks will run");
            return Ok(Some(RunReport::validation_failed(err.to_string())));
        }
        Err(err) => return Err(err),
    };

    let core = CoreEngine::new(graph, max_workers)?;

    // Engine event channel: executor completions flow back to the runtime.
    let (event_tx, event_rx) = mpsc::channel::<EngineEvent>(64);
    let executor = TokioExecutorBackend::new(event_tx);

    let runtime = Runtime::new(core, registry.runnables(), event_rx, executor, TracingSink);

    let started = Instant::now();
    let report = runtime.run().await?;

    report.log_summary();
    info!(elapsed = ?started.elapsed(), "all tasks complete");

    Ok(Some(report))
}

/// Simple plan output for `check`: tasks, dependencies and DAG roots.
fn print_plan(dag: &DagSection, graph: &TaskGraph) {
    println!("dagrun check");
    println!();

    println!("tasks ({}):", dag.tasks.len());
    for decl in &dag.tasks {
        println!("  - {}", decl.name);
        println!("      cmd: {}", decl.cmd);
        if !decl.dependencies.is_empty() {
            println!("      dependencies: {:?}", decl.dependencies);
        }
    }

    let roots: Vec<&str> = (0..graph.len())
        .filter(|&i| graph.dependencies_of(i).is_empty())
        .map(|i| graph.name_of(i))
        .collect();
    println!();
    println!("roots: {roots:?}");

    debug!("check complete (no execution)");
}
