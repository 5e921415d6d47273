// src/exec/command.rs

use std::process::Stdio;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::model::{ConfigFile, TaskConfig};
use crate::task::{Task, TaskSet};

/// Build a [`TaskSet`] from the `[task.<name>]` sections of a config file.
pub fn task_set_from_config(cfg: &ConfigFile) -> TaskSet {
    let mut set = TaskSet::new();
    for (name, tc) in cfg.task.iter() {
        set.insert(name.clone(), command_task(name, tc));
    }
    set
}

/// A task that runs the configured command through the platform shell and
/// produces its trimmed stdout as the task's value.
///
/// Command tasks ignore the shared results map; values flow between them via
/// the filesystem or whatever the commands themselves arrange.
pub fn command_task(name: &str, cfg: &TaskConfig) -> Task {
    let name = name.to_string();
    let cmd = cfg.cmd.clone();
    Task::after(cfg.after.clone(), move |_results| run_command(name, cmd))
}

async fn run_command(name: String, cmd: String) -> Result<Value> {
    info!(task = %name, cmd = %cmd, "starting task process");

    let mut command = shell_command(&cmd);
    command.stdout(Stdio::piped()).stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for task '{}'", name))?;

    // Always consume stderr so buffers don't fill; log at debug.
    if let Some(stderr) = child.stderr.take() {
        let task_name = name.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stderr: {}", line);
            }
        });
    }

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for process of task '{}'", name))?;

    let code = output.status.code().unwrap_or(-1);
    info!(
        task = %name,
        exit_code = code,
        success = output.status.success(),
        "task process exited"
    );

    if !output.status.success() {
        bail!("task '{}' exited with code {}", name, code);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(Value::String(stdout.trim_end().to_string()))
}

/// Build a shell command appropriate for the platform.
fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}
