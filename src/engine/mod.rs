// src/engine/mod.rs

//! Concurrency-bounded execution engine.
//!
//! One coordinating loop owns the scheduler state and dispatches work units
//! onto spawned tokio tasks; completions flow back over a channel and either
//! promote dependents toward the ready queue or abort the run with the
//! failing task's error.

pub mod runtime;

pub use runtime::{TaskName, execute};
