// src/config/validate.rs

use anyhow::{Result, anyhow};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - there is at least one task
/// - all `after` dependencies refer to existing tasks
/// - no task depends on itself
/// - the task graph has no cycles
///
/// The engine re-checks dependency resolution and acyclicity on every run
/// (library callers never go through this layer); the point here is to fail
/// early with config-flavoured messages before any process is spawned.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_task_dependencies(cfg)?;
    execution_order(cfg)?;
    Ok(())
}

/// Topological order of the configured tasks, dependencies first.
///
/// Fails with an error naming a cycle participant if the graph is not a DAG.
/// Used both as the cycle check during validation and to order `--dry-run`
/// output.
pub fn execution_order(cfg: &ConfigFile) -> Result<Vec<String>> {
    // Edge direction: dep -> task
    // For:
    //   [task.build]
    //   after = ["fmt"]
    // we add edge fmt -> build.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(|n| n.to_string()).collect()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(anyhow!(
                "cycle detected in task DAG involving task '{}'",
                node
            ))
        }
    }
}

fn ensure_has_tasks(cfg: &ConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(anyhow!(
            "config must contain at least one [task.<name>] section"
        ));
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &ConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            if !cfg.task.contains_key(dep) {
                return Err(anyhow!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    name,
                    dep
                ));
            }
            if dep == name {
                return Err(anyhow!(
                    "task '{}' cannot depend on itself in `after`",
                    name
                ));
            }
        }
    }
    Ok(())
}
