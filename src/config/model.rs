// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// concurrency = 4
///
/// [task.fmt]
/// cmd = "cargo fmt --check"
///
/// [task.build]
/// cmd = "cargo build"
/// after = ["fmt"]
/// ```
///
/// All sections are optional and have reasonable defaults, except that a
/// config file without any `[task.<name>]` section is rejected by
/// validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Global behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<name>]`.
    ///
    /// Keys are the *task names* (e.g. `"fmt"`, `"build"`).
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSection {
    /// Maximum number of tasks running at once.
    ///
    /// `0` (or absent) means "as many as there are tasks", i.e. effectively
    /// unbounded.
    #[serde(default)]
    pub concurrency: usize,
}

impl ConfigSection {
    /// The configured concurrency limit, with `0` mapped to "no limit".
    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.concurrency > 0).then_some(self.concurrency)
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// The command to execute through the platform shell.
    pub cmd: String,

    /// Dependency list: this task waits for all tasks listed here to
    /// complete successfully.
    #[serde(default)]
    pub after: Vec<String>,
}
