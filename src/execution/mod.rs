//! Batch execution.
//!
//! This module runs resolved artifacts one at a time and aggregates their
//! failures.

pub mod aggregate;
pub mod executor;
pub mod observer;
pub mod runner;

pub use aggregate::{BatchOutcome, FailureAggregator};
pub use executor::BatchExecutor;
pub use observer::{LogObserver, ObserverSet, RecordingObserver, RunEvent, RunObserver};
pub use runner::{ConfigRunner, RunSummary, RunnerState};
