//! Failure aggregation.
//!
//! Per-artifact results are folded into a [`BatchOutcome`] once the whole
//! batch has been attempted. Only then is a failure raised, and only one.

use crate::core::error::{ArtifactFailure, ValidationException};
use serde::{Deserialize, Serialize};

/// Terminal result of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    /// Every artifact built and validated.
    AllSucceeded { attempted: usize },
    /// At least one artifact failed; failures are in occurrence order.
    Failed {
        attempted: usize,
        failures: Vec<ArtifactFailure>,
    },
}

impl BatchOutcome {
    /// Number of artifacts attempted.
    pub fn attempted(&self) -> usize {
        match self {
            BatchOutcome::AllSucceeded { attempted } | BatchOutcome::Failed { attempted, .. } => {
                *attempted
            }
        }
    }

    /// Failures, empty on success.
    pub fn failures(&self) -> &[ArtifactFailure] {
        match self {
            BatchOutcome::AllSucceeded { .. } => &[],
            BatchOutcome::Failed { failures, .. } => failures,
        }
    }

    /// Whether no artifact failed.
    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutcome::AllSucceeded { .. })
    }

    /// Raise the aggregated failure if anything failed.
    pub fn into_result(self) -> Result<usize, ValidationException> {
        match self {
            BatchOutcome::AllSucceeded { attempted } => Ok(attempted),
            BatchOutcome::Failed { failures, .. } => Err(ValidationException::new(failures)),
        }
    }
}

/// Accumulates per-artifact results.
#[derive(Debug, Clone, Default)]
pub struct FailureAggregator {
    attempted: usize,
    failures: Vec<ArtifactFailure>,
}

impl FailureAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of one attempted artifact.
    pub fn record(&mut self, result: Result<(), ArtifactFailure>) {
        self.attempted += 1;
        if let Err(failure) = result {
            self.failures.push(failure);
        }
    }

    /// Artifacts recorded so far.
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Failures recorded so far.
    pub fn failures(&self) -> &[ArtifactFailure] {
        &self.failures
    }

    /// Close the batch.
    pub fn finish(self) -> BatchOutcome {
        if self.failures.is_empty() {
            BatchOutcome::AllSucceeded {
                attempted: self.attempted,
            }
        } else {
            BatchOutcome::Failed {
                attempted: self.attempted,
                failures: self.failures,
            }
        }
    }
}

impl FromIterator<Result<(), ArtifactFailure>> for FailureAggregator {
    fn from_iter<I: IntoIterator<Item = Result<(), ArtifactFailure>>>(iter: I) -> Self {
        let mut aggregator = Self::new();
        for result in iter {
            aggregator.record(result);
        }
        aggregator
    }
}
