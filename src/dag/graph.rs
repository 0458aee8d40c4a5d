// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::registry::TaskRegistry;
use crate::engine::TaskName;
use crate::errors::{DagrunError, Result};

/// Validated dependency structure over the registered tasks.
///
/// Nodes are task indices in declaration order; edges mean "A depends on B"
/// (B must complete before A may start). Construction fails on dangling
/// dependency references and on cycles, so once built the graph is read-only
/// and known acyclic.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    names: Vec<TaskName>,
    index: HashMap<TaskName, usize>,
    /// Direct dependencies of each task, by declaration index.
    deps: Vec<Vec<usize>>,
    /// Direct dependents of each task, by declaration index.
    dependents: Vec<Vec<usize>>,
}

impl TaskGraph {
    /// Build and validate a graph from the full task set.
    pub fn build(registry: &TaskRegistry) -> Result<Self> {
        let tasks = registry.all();

        let mut index: HashMap<TaskName, usize> = HashMap::new();
        for (i, task) in tasks.iter().enumerate() {
            index.insert(task.name.clone(), i);
        }

        let mut deps: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];

        for (i, task) in tasks.iter().enumerate() {
            for dep in &task.dependencies {
                let Some(&dep_idx) = index.get(dep) else {
                    return Err(DagrunError::UnknownDependency {
                        task: task.name.clone(),
                        dependency: dep.clone(),
                    });
                };

                if dep_idx == i {
                    // Trivial cycle; petgraph's GraphMap cannot represent it.
                    return Err(DagrunError::Cycle {
                        path: vec![task.name.clone(), task.name.clone()],
                    });
                }

                deps[i].push(dep_idx);
                dependents[dep_idx].push(i);
            }
        }

        let graph = Self {
            names: tasks.iter().map(|t| t.name.clone()).collect(),
            index,
            deps,
            dependents,
        };

        graph.ensure_acyclic()?;
        Ok(graph)
    }

    /// Validate acyclicity via a full topological reduction; on failure,
    /// report a concrete closed walk through the dependency relation.
    fn ensure_acyclic(&self) -> Result<()> {
        // Edge direction: dep -> task, matching "B must complete before A".
        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();

        for i in 0..self.names.len() {
            graph.add_node(i);
        }
        for (i, deps) in self.deps.iter().enumerate() {
            for &dep in deps {
                graph.add_edge(dep, i, ());
            }
        }

        match toposort(&graph, None) {
            Ok(_order) => Ok(()),
            Err(_cycle) => Err(DagrunError::Cycle {
                path: self.find_cycle(),
            }),
        }
    }

    /// Extract one concrete cycle with a three-color depth-first traversal
    /// over the dependency edges. Only called when a cycle is known to exist.
    fn find_cycle(&self) -> Vec<TaskName> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        fn visit(
            deps: &[Vec<usize>],
            node: usize,
            marks: &mut [Mark],
            path: &mut Vec<usize>,
        ) -> Option<Vec<usize>> {
            marks[node] = Mark::InProgress;
            path.push(node);

            for &dep in &deps[node] {
                match marks[dep] {
                    Mark::InProgress => {
                        let start = path
                            .iter()
                            .position(|&n| n == dep)
                            .unwrap_or(0);
                        let mut cycle: Vec<usize> = path[start..].to_vec();
                        cycle.push(dep);
                        return Some(cycle);
                    }
                    Mark::Unvisited => {
                        if let Some(cycle) = visit(deps, dep, marks, path) {
                            return Some(cycle);
                        }
                    }
                    Mark::Done => {}
                }
            }

            path.pop();
            marks[node] = Mark::Done;
            None
        }

        let mut marks = vec![Mark::Unvisited; self.names.len()];
        let mut path = Vec::new();

        for start in 0..self.names.len() {
            if marks[start] == Mark::Unvisited {
                if let Some(cycle) = visit(&self.deps, start, &mut marks, &mut path) {
                    return cycle.into_iter().map(|i| self.names[i].clone()).collect();
                }
            }
        }

        Vec::new()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Task names in declaration order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    pub fn name_of(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Immediate dependencies of a task, by declaration index.
    pub fn dependencies_of(&self, idx: usize) -> &[usize] {
        &self.deps[idx]
    }

    /// Immediate dependents of a task, by declaration index.
    pub fn dependents_of(&self, idx: usize) -> &[usize] {
        &self.dependents[idx]
    }
}
