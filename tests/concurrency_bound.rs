// tests/concurrency_bound.rs

//! End-to-end runs over the real Tokio executor backend.

use std::collections::BTreeMap;
use std::error::Error;

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use dagrun::dag::{RunReport, RunStatus, TaskGraph, TaskRegistry, TaskState};
use dagrun::engine::{CoreEngine, EngineEvent, Runtime};
use dagrun::events::TracingSink;
use dagrun::exec::TokioExecutorBackend;
use dagrun_test_utils::init_tracing;
use dagrun_test_utils::runnables::{
    ConcurrencyGauge, ExecutionLog, RecordingRunnable, StaticRunnable,
};

type TestResult = Result<(), Box<dyn Error>>;

async fn run_registry(
    registry: TaskRegistry,
    max_workers: usize,
) -> Result<RunReport, Box<dyn Error>> {
    let graph = TaskGraph::build(&registry)?;
    let core = CoreEngine::new(graph, max_workers)?;

    let (event_tx, event_rx) = mpsc::channel::<EngineEvent>(64);
    let executor = TokioExecutorBackend::new(event_tx);
    let runtime = Runtime::new(core, registry.runnables(), event_rx, executor, TracingSink);

    let report = timeout(Duration::from_secs(5), runtime.run())
        .await
        .map_err(|_| "runtime did not finish within 5 seconds")??;
    Ok(report)
}

#[tokio::test]
async fn worker_pool_bound_is_respected() -> TestResult {
    init_tracing();

    let gauge = ConcurrencyGauge::new();
    let mut registry = TaskRegistry::new();
    for name in ["t1", "t2", "t3", "t4", "t5", "t6"] {
        registry.register(
            name.to_string(),
            vec![],
            gauge.runnable(Duration::from_millis(25)),
        )?;
    }

    let report = run_registry(registry, 2).await?;

    assert_eq!(report.status, RunStatus::AllSucceeded);
    assert_eq!(gauge.peak(), 2, "two workers should saturate the pool");

    Ok(())
}

#[tokio::test]
async fn diamond_orders_starts_after_dependency_ends() -> TestResult {
    init_tracing();

    let log = ExecutionLog::new();
    let hold = Duration::from_millis(50);

    let mut registry = TaskRegistry::new();
    registry.register(
        "a".to_string(),
        vec![],
        RecordingRunnable::slow("a", log.clone(), hold),
    )?;
    registry.register(
        "b".to_string(),
        vec!["a".to_string()],
        RecordingRunnable::slow("b", log.clone(), hold),
    )?;
    registry.register(
        "c".to_string(),
        vec!["a".to_string()],
        RecordingRunnable::slow("c", log.clone(), hold),
    )?;
    registry.register(
        "d".to_string(),
        vec!["b".to_string(), "c".to_string()],
        RecordingRunnable::slow("d", log.clone(), hold),
    )?;

    let report = run_registry(registry, 2).await?;
    assert_eq!(report.status, RunStatus::AllSucceeded);

    let pos = |marker: &str| {
        log.position(marker)
            .unwrap_or_else(|| panic!("marker '{marker}' missing from log"))
    };

    // b and c strictly after a; d strictly after both.
    assert!(pos("end:a") < pos("start:b"));
    assert!(pos("end:a") < pos("start:c"));
    assert!(pos("end:b") < pos("start:d"));
    assert!(pos("end:c") < pos("start:d"));

    // b and c actually overlapped on the two workers.
    assert!(pos("start:c") < pos("end:b"));

    Ok(())
}

#[tokio::test]
async fn skipped_task_runnable_is_never_invoked() -> TestResult {
    init_tracing();

    let log = ExecutionLog::new();

    let mut registry = TaskRegistry::new();
    registry.register(
        "a".to_string(),
        vec![],
        RecordingRunnable::failing("a", log.clone(), "simulated failure"),
    )?;
    registry.register(
        "b".to_string(),
        vec!["a".to_string()],
        RecordingRunnable::new("b", log.clone()),
    )?;

    let report = run_registry(registry, 2).await?;

    assert_eq!(report.status, RunStatus::PartialFailure);
    assert_eq!(report.state_of("a"), Some(TaskState::Failed));
    assert_eq!(report.state_of("b"), Some(TaskState::Skipped));
    assert_eq!(
        report.tasks["a"].detail.as_deref(),
        Some("simulated failure")
    );

    let entries = log.entries();
    assert!(entries.contains(&"start:a".to_string()));
    assert!(
        !entries.iter().any(|e| e.contains(":b")),
        "skipped task must never execute, got {entries:?}"
    );

    Ok(())
}

#[tokio::test]
async fn identical_runs_produce_identical_terminal_states() -> TestResult {
    init_tracing();

    let specs: &[(&str, &[&str])] = &[
        ("a", &[]),
        ("b", &["a"]),
        ("c", &["a"]),
        ("d", &["b", "c"]),
        ("e", &[]),
    ];

    let mut outcomes: Vec<BTreeMap<String, TaskState>> = Vec::new();

    for _ in 0..2 {
        let mut registry = TaskRegistry::new();
        for (name, deps) in specs {
            registry.register(
                name.to_string(),
                deps.iter().map(|d| d.to_string()).collect(),
                StaticRunnable::succeed(),
            )?;
        }

        let report = run_registry(registry, 3).await?;
        assert_eq!(report.status, RunStatus::AllSucceeded);

        outcomes.push(
            report
                .tasks
                .iter()
                .map(|(name, t)| (name.clone(), t.state))
                .collect(),
        );
    }

    assert_eq!(outcomes[0], outcomes[1]);

    Ok(())
}
