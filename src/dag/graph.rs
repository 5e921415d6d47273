// src/dag/graph.rs

use std::collections::HashMap;

use crate::errors::GraphError;
use crate::task::TaskSet;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct DagNode {
    /// Direct dependencies: tasks that must complete before this one can run.
    deps: Vec<String>,
    /// Direct dependents: tasks that depend on this one.
    dependents: Vec<String>,
}

/// Simple in-memory DAG representation keyed by task name.
///
/// This is intentionally lightweight; adjacency is kept for validation and
/// diagnostics, while the per-run bookkeeping lives in
/// [`crate::dag::Scheduler`].
#[derive(Debug, Clone)]
pub struct TaskGraph {
    nodes: HashMap<String, DagNode>,
}

impl TaskGraph {
    /// Build a DAG from a [`TaskSet`].
    ///
    /// Dependency names are taken as declared; [`TaskGraph::validate`] is
    /// what decides whether they actually resolve.
    pub fn from_set(set: &TaskSet) -> Self {
        let mut nodes: HashMap<String, DagNode> = HashMap::new();

        // First pass: create nodes with their dependency lists.
        for (name, task) in set.iter() {
            nodes.insert(
                name.to_string(),
                DagNode {
                    deps: task.dependencies().to_vec(),
                    dependents: Vec::new(),
                },
            );
        }

        // Second pass: populate dependents based on deps.
        let task_names: Vec<String> = nodes.keys().cloned().collect();
        for task_name in task_names {
            // clone to avoid borrowing issues while mutating
            let deps = nodes
                .get(&task_name)
                .map(|n| n.deps.clone())
                .unwrap_or_default();

            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(task_name.clone());
                }
            }
        }

        Self { nodes }
    }

    /// Return all task names.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that list this one as a
    /// dependency).
    pub fn dependents_of(&self, name: &str) -> &[String] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Check that the graph is schedulable.
    ///
    /// Two things can go wrong:
    /// - a task names a dependency that does not exist in the set;
    /// - the graph contains a cycle, leaving some tasks permanently blocked.
    ///
    /// Both must be caught here, before any work unit runs.
    pub fn validate(&self) -> Result<(), GraphError> {
        self.check_dependencies_exist()?;
        self.check_all_reachable()
    }

    fn check_dependencies_exist(&self) -> Result<(), GraphError> {
        for (name, node) in self.nodes.iter() {
            for dep in node.deps.iter() {
                if !self.nodes.contains_key(dep) {
                    return Err(GraphError::MissingDependency {
                        task: name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Kahn's algorithm, reachability variant.
    ///
    /// Start from every zero-dependency task and sweep forward, decrementing
    /// each dependent's unchecked-dependency counter; a dependent joins the
    /// frontier when its counter reaches zero. If the sweep does not visit
    /// every task, the stragglers sit on (or behind) a cycle.
    fn check_all_reachable(&self) -> Result<(), GraphError> {
        let mut frontier: Vec<&str> = Vec::new();
        let mut unchecked: HashMap<&str, usize> = HashMap::new();

        for (name, node) in self.nodes.iter() {
            if node.deps.is_empty() {
                frontier.push(name.as_str());
            } else {
                unchecked.insert(name.as_str(), node.deps.len());
            }
        }

        let mut visited = 0;
        while let Some(current) = frontier.pop() {
            visited += 1;
            for dependent in self.dependents_of(current) {
                if let Some(remaining) = unchecked.get_mut(dependent.as_str()) {
                    *remaining -= 1;
                    if *remaining == 0 {
                        frontier.push(dependent.as_str());
                    }
                }
            }
        }

        let total = self.nodes.len();
        if visited != total {
            return Err(GraphError::CyclicDependency {
                unreached: total - visited,
                total,
            });
        }
        Ok(())
    }
}
