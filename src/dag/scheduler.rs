// src/dag/scheduler.rs

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::task::TaskSet;

/// Per-run dependency bookkeeping.
///
/// The scheduler owns three pieces of state:
/// - the FIFO ready queue of tasks whose dependencies are all satisfied;
/// - an outstanding-dependency counter per blocked task;
/// - the listener registry: for each task, the dependents to advance when it
///   completes successfully. A dependent is listed once per dependency it
///   declares, so repeated declarations keep counters and notifications in
///   lockstep.
///
/// It decides *which* tasks may run next; *when* they run (the concurrency
/// cap) is the engine's business.
#[derive(Debug)]
pub struct Scheduler {
    /// Tasks ready to dispatch, in FIFO order. Seeded with every
    /// zero-dependency task, in task-set order.
    ready: VecDeque<String>,
    /// Successful completions each blocked task still waits for.
    outstanding: HashMap<String, usize>,
    /// task name -> dependents to notify on its successful completion.
    listeners: HashMap<String, Vec<String>>,
}

impl Scheduler {
    /// Build the per-run state from a validated task set.
    pub fn from_set(set: &TaskSet) -> Self {
        let mut ready = VecDeque::new();
        let mut outstanding = HashMap::new();
        let mut listeners: HashMap<String, Vec<String>> = HashMap::new();

        for (name, task) in set.iter() {
            let deps = task.dependencies();
            if deps.is_empty() {
                ready.push_back(name.to_string());
                continue;
            }

            outstanding.insert(name.to_string(), deps.len());
            for dep in deps {
                listeners
                    .entry(dep.clone())
                    .or_default()
                    .push(name.to_string());
            }
        }

        Self {
            ready,
            outstanding,
            listeners,
        }
    }

    /// Dequeue the next ready task, if any.
    pub fn pop_ready(&mut self) -> Option<String> {
        self.ready.pop_front()
    }

    /// Record the successful completion of `task` and fire its listeners.
    ///
    /// Each registered dependent has its outstanding counter decremented;
    /// hitting zero moves it from blocked to the back of the ready queue.
    /// The listener list is consumed, so a completion notifies exactly once.
    ///
    /// A failed task must never be passed here: its dependents stay blocked
    /// for good.
    pub fn mark_complete(&mut self, task: &str) {
        let Some(dependents) = self.listeners.remove(task) else {
            return;
        };

        for dependent in dependents {
            let Some(remaining) = self.outstanding.get_mut(&dependent) else {
                continue;
            };
            *remaining -= 1;
            if *remaining == 0 {
                debug!(task = %dependent, "dependencies satisfied; task is ready");
                self.outstanding.remove(&dependent);
                self.ready.push_back(dependent);
            }
        }
    }

    /// True when nothing is queued and nothing is blocked.
    pub fn is_drained(&self) -> bool {
        self.ready.is_empty() && self.outstanding.is_empty()
    }
}
