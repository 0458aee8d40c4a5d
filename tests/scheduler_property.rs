// tests/scheduler_property.rs

//! Property tests simulating the core engine over randomly generated DAGs.

use std::collections::{HashSet, VecDeque};

use proptest::prelude::*;

use dagrun::dag::{TaskGraph, TaskRegistry, TaskState};
use dagrun::engine::{CoreCommand, CoreEngine, CoreStep, EngineEvent, TaskOutcome};
use dagrun_test_utils::runnables::StaticRunnable;

/// Dependency lists where task N may only depend on tasks 0..N, so the
/// generated graph is acyclic by construction.
fn dag_specs_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(move |raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    let unique: HashSet<usize> = potential
                        .into_iter()
                        .filter(|_| i > 0)
                        .map(|d| d % i)
                        .collect();
                    let mut deps: Vec<usize> = unique.into_iter().collect();
                    deps.sort_unstable();
                    deps
                })
                .collect()
        })
    })
}

fn drain_dispatches(step: CoreStep, executing: &mut VecDeque<String>) {
    for command in step.commands {
        match command {
            CoreCommand::Dispatch(tasks) => executing.extend(tasks),
        }
    }
}

proptest! {
    #[test]
    fn scheduler_terminates_and_obeys_the_laws(
        deps in dag_specs_strategy(8),
        failing_raw in proptest::collection::vec(0..8usize, 0..4),
        max_workers in 1..4usize,
    ) {
        let num = deps.len();
        let names: Vec<String> = (0..num).map(|i| format!("task_{i}")).collect();
        let failing: HashSet<usize> =
            failing_raw.into_iter().filter(|&i| i < num).collect();

        let mut registry = TaskRegistry::new();
        for (i, task_deps) in deps.iter().enumerate() {
            registry
                .register(
                    names[i].clone(),
                    task_deps.iter().map(|&d| names[d].clone()).collect(),
                    StaticRunnable::succeed(),
                )
                .unwrap();
        }

        let graph = TaskGraph::build(&registry).expect("generated DAG is acyclic");
        let mut engine = CoreEngine::new(graph, max_workers).unwrap();

        // Queue of tasks currently "executing"; completions are delivered
        // FIFO, which is one arbitrary interleaving of concurrent finishes.
        let mut executing: VecDeque<String> = VecDeque::new();

        let step = engine.start();
        prop_assert!(engine.running_count() <= max_workers);
        drain_dispatches(step, &mut executing);

        let mut steps = 0;
        let max_steps = 1000;

        while let Some(task) = executing.pop_front() {
            steps += 1;
            prop_assert!(steps < max_steps, "simulation did not terminate");

            let idx: usize = task.strip_prefix("task_").unwrap().parse().unwrap();
            let outcome = if failing.contains(&idx) {
                TaskOutcome::Failed("injected failure".to_string())
            } else {
                TaskOutcome::Success
            };

            let step = engine.step(EngineEvent::TaskFinished { task, outcome });
            prop_assert!(engine.running_count() <= max_workers);
            drain_dispatches(step, &mut executing);
        }

        prop_assert!(engine.is_complete(), "every task must reach a terminal state");

        let report = engine.into_report();
        for (i, task_deps) in deps.iter().enumerate() {
            let state = report.state_of(&names[i]).unwrap();
            let any_bad_dep = task_deps.iter().any(|&d| {
                matches!(
                    report.state_of(&names[d]).unwrap(),
                    TaskState::Failed | TaskState::Skipped
                )
            });

            if any_bad_dep {
                // Propagation law: a task below a failure never runs.
                prop_assert_eq!(state, TaskState::Skipped);
            } else if failing.contains(&i) {
                prop_assert_eq!(state, TaskState::Failed);
            } else {
                prop_assert_eq!(state, TaskState::Succeeded);
            }
        }
    }
}
