// src/task.rs

//! Task set data model: named tasks, their dependency lists, and their work
//! units.
//!
//! A [`TaskSet`] is the flat description handed to [`crate::execute`]. Each
//! [`Task`] owns exactly one work unit, an async closure that receives the
//! shared results map of the current run and either produces a
//! [`serde_json::Value`] or fails with an [`anyhow::Error`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tokio::sync::Mutex;

/// Aggregated results of a run, keyed by task name.
///
/// A task whose work unit produces no meaningful value is present as
/// [`Value::Null`]; entries are never omitted.
pub type TaskResults = HashMap<String, Value>;

/// Shared handle to the results of the current run.
///
/// Every work unit receives a clone of this handle. Work units may read the
/// values of already-completed tasks and may insert or mutate arbitrary
/// entries; such writes are visible to all subsequently started tasks and to
/// the final aggregate returned to the caller.
pub type SharedResults = Arc<Mutex<TaskResults>>;

/// The future a work unit evaluates to: a value, or a failure that aborts the
/// whole run.
pub type WorkFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

/// A task body. Invoked at most once per run.
pub type Work = Box<dyn FnOnce(SharedResults) -> WorkFuture + Send>;

/// A named unit of work plus the tasks that must complete successfully before
/// it may start.
pub struct Task {
    after: Vec<String>,
    work: Work,
}

impl Task {
    /// A task with no dependencies.
    pub fn new<F, Fut>(work: F) -> Self
    where
        F: FnOnce(SharedResults) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self::after(Vec::<String>::new(), work)
    }

    /// A task that runs only after every task named in `after` has completed
    /// successfully.
    pub fn after<I, S, F, Fut>(after: I, work: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce(SharedResults) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            after: after.into_iter().map(Into::into).collect(),
            work: Box::new(move |results| Box::pin(work(results))),
        }
    }

    /// Dependency names, in declaration order.
    pub fn dependencies(&self) -> &[String] {
        &self.after
    }

    /// Take the work unit out of the task. Each task runs at most once, so
    /// the engine consumes bodies rather than borrowing them.
    pub(crate) fn into_work(self) -> Work {
        self.work
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("after", &self.after).finish_non_exhaustive()
    }
}

/// The flat task description for a single run.
///
/// Keys are task names. The map is ordered (`BTreeMap`), which makes the
/// seeding of the ready queue deterministic; name order is only a tie-break
/// among simultaneously-ready tasks, never a scheduling guarantee.
#[derive(Debug, Default)]
pub struct TaskSet {
    tasks: BTreeMap<String, Task>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task under `name`, replacing any previous task with that name.
    pub fn insert(&mut self, name: impl Into<String>, task: Task) -> &mut Self {
        self.tasks.insert(name.into(), task);
        self
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Iterate tasks in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Task)> {
        self.tasks.iter().map(|(name, task)| (name.as_str(), task))
    }

    pub(crate) fn into_tasks(self) -> BTreeMap<String, Task> {
        self.tasks
    }
}
