// src/exec/mod.rs

//! Process execution layer.
//!
//! Turns the shell commands defined in `[task.<name>]` sections into engine
//! work units, using `tokio::process::Command`. Each command's captured
//! stdout becomes the task's value in the aggregated results.

pub mod command;

pub use command::{command_task, task_set_from_config};
