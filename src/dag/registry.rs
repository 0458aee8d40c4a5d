// src/dag/registry.rs

//! Task registry: the declared tasks and their raw dependency lists.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::config::model::DagSection;
use crate::engine::TaskName;
use crate::errors::{DagrunError, Result};
use crate::exec::{Runnable, ShellRunnable};

/// A declared unit of work: name, raw dependency names and the opaque
/// runnable capability supplied by the caller.
#[derive(Clone)]
pub struct RegisteredTask {
    pub name: TaskName,
    pub dependencies: Vec<TaskName>,
    pub runnable: Arc<dyn Runnable>,
}

impl fmt::Debug for RegisteredTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTask")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Pure lookup table of registered tasks, keyed by name.
///
/// Declaration order is preserved so that the scheduler's tie-breaking is
/// reproducible across runs regardless of map iteration order.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<RegisteredTask>,
    index: HashMap<TaskName, usize>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the `[dag]` config section, wiring each task's
    /// `cmd` into a [`ShellRunnable`].
    pub fn from_config(dag: &DagSection) -> Result<Self> {
        if dag.tasks.is_empty() {
            return Err(DagrunError::ConfigError(
                "dag must declare at least one task".to_string(),
            ));
        }

        let mut registry = Self::new();
        for decl in &dag.tasks {
            let runnable = Arc::new(ShellRunnable::new(decl.name.as_str(), decl.cmd.as_str()));
            registry.register(decl.name.clone(), decl.dependencies.clone(), runnable)?;
        }
        Ok(registry)
    }

    /// Register a task. Fails with [`DagrunError::DuplicateTask`] if the name
    /// is already present.
    pub fn register(
        &mut self,
        name: TaskName,
        dependencies: Vec<TaskName>,
        runnable: Arc<dyn Runnable>,
    ) -> Result<()> {
        if self.index.contains_key(&name) {
            return Err(DagrunError::DuplicateTask(name));
        }

        self.index.insert(name.clone(), self.tasks.len());
        self.tasks.push(RegisteredTask {
            name,
            dependencies,
            runnable,
        });
        Ok(())
    }

    /// All registered tasks in declaration order.
    pub fn all(&self) -> &[RegisteredTask] {
        &self.tasks
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Hand the runnables over to the runtime, keyed by task name.
    pub fn runnables(&self) -> HashMap<TaskName, Arc<dyn Runnable>> {
        self.tasks
            .iter()
            .map(|t| (t.name.clone(), Arc::clone(&t.runnable)))
            .collect()
    }
}
