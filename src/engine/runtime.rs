// src/engine/runtime.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::dag::{Scheduler, TaskGraph};
use crate::task::{SharedResults, Task, TaskResults, TaskSet};

/// Public type alias for task names throughout the engine.
pub type TaskName = String;

/// Completion event sent from a worker back to the engine loop.
///
/// On success the worker has already written the produced value into the
/// shared results map before sending, so the event only carries the outcome.
#[derive(Debug)]
struct Completion {
    task: TaskName,
    outcome: Result<()>,
}

/// Execute a set of named, dependency-ordered tasks.
///
/// Independent tasks overlap, up to `concurrency` running at once; a task
/// never starts before every task it lists as a dependency has completed
/// successfully. `None` (or `Some(0)`) means "as many as there are tasks",
/// i.e. effectively unbounded.
///
/// Returns:
/// - `Ok(Some(results))` with one entry per task (work units that produce no
///   value appear as `Value::Null`, plus whatever extra entries task bodies
///   inserted themselves);
/// - `Ok(None)` for an empty task set;
/// - `Err` with a [`crate::GraphError`] if the set is unschedulable, before
///   any work unit runs;
/// - `Err` with the first task failure, untransformed, as soon as the engine
///   observes it.
pub async fn execute(tasks: TaskSet, concurrency: Option<usize>) -> Result<Option<TaskResults>> {
    if tasks.is_empty() {
        debug!("empty task set; nothing to run");
        return Ok(None);
    }

    let total = tasks.len();
    let concurrency = match concurrency {
        Some(n) if n > 0 => n,
        _ => total,
    };

    // Validation gate: no task side effects may happen on a broken graph.
    let graph = TaskGraph::from_set(&tasks);
    graph.validate()?;

    let runtime = Runtime::new(tasks, concurrency);
    runtime.run().await.map(Some)
}

/// The run loop: owns all scheduler state and is the only place that state
/// is mutated. Work units execute on spawned tokio tasks and report back
/// over an mpsc channel, so suspension points live exclusively inside task
/// bodies.
struct Runtime {
    scheduler: Scheduler,
    /// Work units not yet dispatched, consumed one by one.
    work: BTreeMap<TaskName, Task>,
    results: SharedResults,
    concurrency: usize,
    running: usize,
    events_tx: mpsc::Sender<Completion>,
    events_rx: mpsc::Receiver<Completion>,
}

impl Runtime {
    fn new(tasks: TaskSet, concurrency: usize) -> Self {
        let scheduler = Scheduler::from_set(&tasks);
        let (events_tx, events_rx) = mpsc::channel::<Completion>(64);

        Self {
            scheduler,
            work: tasks.into_tasks(),
            results: Arc::new(Mutex::new(TaskResults::new())),
            concurrency,
            running: 0,
            events_tx,
            events_rx,
        }
    }

    /// Drive the run to completion or first failure.
    ///
    /// Failure policy: the first failed task aborts the run with that task's
    /// error. Nothing further is dispatched, but already-running siblings are
    /// not cancelled; they finish in the background and their values are
    /// still recorded in the shared map, without waking any more dependents.
    async fn run(mut self) -> Result<TaskResults> {
        info!(
            tasks = self.work.len(),
            concurrency = self.concurrency,
            "starting task graph run"
        );

        self.drain_ready();

        while let Some(Completion { task, outcome }) = self.events_rx.recv().await {
            self.running -= 1;

            match outcome {
                Ok(()) => {
                    debug!(task = %task, running = self.running, "task completed");
                    self.scheduler.mark_complete(&task);
                    self.drain_ready();

                    if self.running == 0 && self.scheduler.is_drained() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(task = %task, "task failed; aborting run");
                    return Err(err);
                }
            }
        }

        info!("task graph run finished");
        let results = std::mem::take(&mut *self.results.lock().await);
        Ok(results)
    }

    /// Dispatch ready tasks until the queue empties or the cap is reached.
    /// Re-invoked after every completion.
    fn drain_ready(&mut self) {
        while self.running < self.concurrency {
            let Some(name) = self.scheduler.pop_ready() else {
                break;
            };
            self.dispatch(name);
        }
    }

    fn dispatch(&mut self, name: TaskName) {
        let Some(task) = self.work.remove(&name) else {
            warn!(task = %name, "ready task has no work unit; ignoring");
            return;
        };

        self.running += 1;
        debug!(task = %name, running = self.running, "dispatching task");

        let work = task.into_work();
        let results = Arc::clone(&self.results);
        let events_tx = self.events_tx.clone();

        tokio::spawn(async move {
            let outcome = match work(Arc::clone(&results)).await {
                Ok(value) => {
                    results.lock().await.insert(name.clone(), value);
                    Ok(())
                }
                Err(err) => Err(err),
            };

            // The receiver is gone once the run has failed; a late sibling's
            // value is already recorded above, it just no longer cascades.
            let _ = events_tx.send(Completion { task: name, outcome }).await;
        });
    }
}
