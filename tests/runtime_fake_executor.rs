// tests/runtime_fake_executor.rs

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use dagrun::config::DagSection;
use dagrun::dag::{RunReport, RunStatus, TaskGraph, TaskRegistry, TaskState};
use dagrun::engine::{CoreEngine, EngineEvent, Runtime};
use dagrun_test_utils::builders::DagSectionBuilder;
use dagrun_test_utils::fake_executor::FakeExecutor;
use dagrun_test_utils::init_tracing;
use dagrun_test_utils::runnables::RecordingSink;

type TestResult = Result<(), Box<dyn Error>>;

/// Very simple chain: a -> b
fn simple_chain() -> DagSection {
    DagSectionBuilder::new().task("a", &[]).task("b", &["a"]).build()
}

async fn run_with_fake_executor(
    dag: DagSection,
    max_workers: usize,
    failing: &[&str],
) -> Result<(RunReport, Vec<String>, RecordingSink), Box<dyn Error>> {
    let registry = TaskRegistry::from_config(&dag)?;
    let graph = TaskGraph::build(&registry)?;
    let core = CoreEngine::new(graph, max_workers)?;

    let (event_tx, event_rx) = mpsc::channel::<EngineEvent>(16);
    let executed = Arc::new(Mutex::new(Vec::new()));
    let executor =
        FakeExecutor::new(event_tx, executed.clone()).with_failing(failing.iter().copied());
    let sink = RecordingSink::new();

    let runtime = Runtime::new(core, registry.runnables(), event_rx, executor, sink.clone());

    // Enforce an upper bound on how long the runtime may take.
    let report = timeout(Duration::from_secs(3), runtime.run())
        .await
        .map_err(|_| "runtime did not finish within 3 seconds")??;

    let executed = executed.lock().unwrap().clone();
    Ok((report, executed, sink))
}

#[tokio::test]
async fn runtime_runs_simple_chain_in_order() -> TestResult {
    init_tracing();

    let (report, executed, sink) = run_with_fake_executor(simple_chain(), 1, &[]).await?;

    assert_eq!(executed, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(report.status, RunStatus::AllSucceeded);
    assert_eq!(
        sink.events(),
        vec![
            "started:a",
            "finished:a:success",
            "started:b",
            "finished:b:success",
        ]
    );

    Ok(())
}

#[tokio::test]
async fn failed_root_prevents_dependent_from_ever_running() -> TestResult {
    init_tracing();

    let (report, executed, sink) = run_with_fake_executor(simple_chain(), 1, &["a"]).await?;

    // b's runnable was never dispatched.
    assert_eq!(executed, vec!["a".to_string()]);
    assert_eq!(report.status, RunStatus::PartialFailure);
    assert_eq!(report.state_of("a"), Some(TaskState::Failed));
    assert_eq!(report.state_of("b"), Some(TaskState::Skipped));

    // No lifecycle events for b either: it never started.
    assert_eq!(sink.events(), vec!["started:a", "finished:a:failed"]);

    Ok(())
}

#[tokio::test]
async fn independent_branch_still_runs_after_a_failure() -> TestResult {
    init_tracing();

    let dag = DagSectionBuilder::new()
        .task("a", &[])
        .task("b", &["a"])
        .task("c", &[])
        .build();

    let (report, executed, _sink) = run_with_fake_executor(dag, 1, &["a"]).await?;

    // c has no dependency on a and runs despite the failure.
    assert!(executed.contains(&"c".to_string()));
    assert_eq!(report.state_of("c"), Some(TaskState::Succeeded));
    assert_eq!(report.state_of("b"), Some(TaskState::Skipped));
    assert_eq!(report.status, RunStatus::PartialFailure);

    Ok(())
}

#[tokio::test]
async fn every_declared_task_has_a_report_entry() -> TestResult {
    init_tracing();

    let dag = DagSectionBuilder::new()
        .task("a", &[])
        .task("b", &["a"])
        .task("c", &["b"])
        .task("d", &[])
        .build();

    let (report, _executed, _sink) = run_with_fake_executor(dag, 2, &["a"]).await?;

    assert_eq!(report.tasks.len(), 4);
    for name in ["a", "b", "c", "d"] {
        let entry = &report.tasks[name];
        assert!(entry.state.is_terminal(), "{name} must end terminal");
    }

    Ok(())
}
