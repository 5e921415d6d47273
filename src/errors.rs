// src/errors.rs

//! Crate-wide error types.
//!
//! Task-body failures travel as plain [`anyhow::Error`] values and reach the
//! caller untouched. Structural problems with the task graph are
//! [`GraphError`]s, raised before any work unit runs; callers that need to
//! distinguish the two can downcast.

use thiserror::Error;

/// A task set that can never be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A task names a dependency that is not in the task set.
    #[error("task '{task}' has unknown dependency '{dependency}'")]
    MissingDependency { task: String, dependency: String },

    /// Some tasks sit on (or behind) a dependency cycle and can never become
    /// ready.
    #[error("cyclic dependency: {unreached} of {total} tasks can never become ready")]
    CyclicDependency { unreached: usize, total: usize },
}

pub use anyhow::{Error, Result};
