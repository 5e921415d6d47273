// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod task;

pub use engine::execute;
pub use errors::GraphError;
pub use task::{SharedResults, Task, TaskResults, TaskSet};

use anyhow::Result;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::config::validate::execution_order;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + validation
/// - the command execution layer
/// - the task graph engine
/// - result printing
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(());
    }

    let concurrency = args.concurrency.or(cfg.config.concurrency_limit());
    let tasks = exec::task_set_from_config(&cfg);

    match engine::execute(tasks, concurrency).await? {
        Some(results) => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        None => {
            // Config validation requires at least one task, so this branch
            // only matters for callers that bypass the config layer.
            debug!("no tasks configured; nothing to run");
        }
    }

    Ok(())
}

/// Simple dry-run output: print tasks in execution order with deps and
/// commands.
fn print_dry_run(cfg: &ConfigFile) -> Result<()> {
    let order = execution_order(cfg)?;

    println!("dagrun dry-run");
    match cfg.config.concurrency_limit() {
        Some(n) => println!("  config.concurrency = {n}"),
        None => println!("  config.concurrency = unbounded"),
    }
    println!();

    println!("tasks ({}), dependencies first:", cfg.task.len());
    for name in order {
        // execution_order only yields names present in the task table.
        let Some(task) = cfg.task.get(&name) else {
            continue;
        };
        println!("  - {name}");
        println!("      cmd: {}", task.cmd);
        if !task.after.is_empty() {
            println!("      after: {:?}", task.after);
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
