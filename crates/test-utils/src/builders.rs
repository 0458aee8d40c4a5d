#![allow(dead_code)]

use dagrun::config::{DagSection, TaskDecl};
use dagrun::dag::{TaskGraph, TaskRegistry};

use crate::runnables::StaticRunnable;

/// Builder for a `[dag]` section to simplify test setup.
pub struct DagSectionBuilder {
    dag: DagSection,
}

impl DagSectionBuilder {
    pub fn new() -> Self {
        Self {
            dag: DagSection { tasks: Vec::new() },
        }
    }

    pub fn with_task(mut self, decl: TaskDecl) -> Self {
        self.dag.tasks.push(decl);
        self
    }

    /// Convenience: add a task named `name` depending on `deps`, with a
    /// placeholder echo command.
    pub fn task(self, name: &str, deps: &[&str]) -> Self {
        let mut builder = TaskDeclBuilder::new(name, &format!("echo {name}"));
        for dep in deps {
            builder = builder.dependency(dep);
        }
        self.with_task(builder.build())
    }

    pub fn build(self) -> DagSection {
        self.dag
    }
}

impl Default for DagSectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a single `[[dag.tasks]]` declaration.
pub struct TaskDeclBuilder {
    decl: TaskDecl,
}

impl TaskDeclBuilder {
    pub fn new(name: &str, cmd: &str) -> Self {
        Self {
            decl: TaskDecl {
                name: name.to_string(),
                cmd: cmd.to_string(),
                dependencies: vec![],
            },
        }
    }

    pub fn dependency(mut self, dep: &str) -> Self {
        self.decl.dependencies.push(dep.to_string());
        self
    }

    pub fn build(self) -> TaskDecl {
        self.decl
    }
}

/// Registry of `(name, deps)` specs backed by always-succeeding runnables.
pub fn registry_of(specs: &[(&str, &[&str])]) -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    for (name, deps) in specs {
        registry
            .register(
                name.to_string(),
                deps.iter().map(|d| d.to_string()).collect(),
                StaticRunnable::succeed(),
            )
            .expect("duplicate task in test spec");
    }
    registry
}

/// Validated graph of `(name, deps)` specs; panics on invalid test input.
pub fn graph_of(specs: &[(&str, &[&str])]) -> TaskGraph {
    TaskGraph::build(&registry_of(specs)).expect("test spec should build a valid graph")
}
