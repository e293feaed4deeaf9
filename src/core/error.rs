//! Error types for the config runner.
//!
//! Uses thiserror for structured errors with context. Errors are designed to:
//! - Separate fatal resolution problems from isolated per-artifact failures
//! - Carry the artifact that failed so operators know what to rerun
//! - Support conversion into the top-level [`RunnerError`]

use crate::core::artifact::ArtifactRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Summary message carried by every aggregated validation failure.
pub const AGGREGATED_FAILURE_MESSAGE: &str = "Some of the validations raised an exception";

/// Unique identifier for one runner invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Top-level error type for the config runner.
///
/// Only resolution problems, settings problems and the aggregated
/// validation failure ever reach the caller; per-artifact failures are
/// absorbed by the batch executor.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("{0}")]
    Validation(#[from] ValidationException),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RunnerError {
    /// Process exit code the binary reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunnerError::Validation(_) => 1,
            _ => 2,
        }
    }
}

/// Errors raised while deciding which artifacts to run.
///
/// All of these are fatal: the batch never starts.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("No config file or config directory was provided")]
    NoTarget,

    #[error("Config directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Shard index {index} is out of range for {} ({count} artifact(s))", dir.display())]
    ShardIndexOutOfRange {
        index: usize,
        count: usize,
        dir: PathBuf,
    },

    #[error("Shard index {index} selected '{found}', expected '{expected}'")]
    ShardNameMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid shard index '{value}' in ${var}: expected a non-negative integer")]
    InvalidShardIndex { var: String, value: String },

    #[error("Invalid artifact pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },

    #[error("Failed to list {}: {error}", path.display())]
    Io { path: PathBuf, error: String },
}

/// Errors loading [`RunnerSettings`](crate::core::settings::RunnerSettings).
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid setting '{key}': {reason}")]
    Invalid { key: String, reason: String },
}

/// Errors from the bundled YAML config builder.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("{} does not list any validations", path.display())]
    NoValidations { path: PathBuf },
}

/// Errors from the bundled dry-run engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No validation backend is linked into this binary; rerun with --dry-run to inspect {artifact}")]
    NotAvailable { artifact: String },

    #[error("Failed to render config: {0}")]
    Render(#[from] serde_json::Error),
}

/// One isolated per-artifact failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFailure {
    /// Artifact whose build or validation failed.
    pub artifact: ArtifactRef,
    /// Display text of the error that was raised.
    pub message: String,
}

impl ArtifactFailure {
    /// Create a failure record.
    pub fn new(artifact: ArtifactRef, message: impl Into<String>) -> Self {
        Self {
            artifact,
            message: message.into(),
        }
    }

    /// Operator-facing skip line for this failure.
    pub fn skip_message(&self) -> String {
        format!(
            "Error '{}' occurred while running config file {}. Skipping it for now.",
            self.message,
            self.artifact.name()
        )
    }
}

impl fmt::Display for ArtifactFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.artifact, self.message)
    }
}

/// Aggregated failure raised once a batch finished with at least one
/// failed artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationException {
    /// Fixed summary message.
    pub message: String,
    /// Individual failures, in the order they occurred.
    pub failures: Vec<ArtifactFailure>,
}

impl ValidationException {
    /// Build the aggregated failure from the collected per-artifact failures.
    pub fn new(failures: Vec<ArtifactFailure>) -> Self {
        Self {
            message: AGGREGATED_FAILURE_MESSAGE.to_string(),
            failures,
        }
    }

    /// Number of failed artifacts.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Result type alias for resolution.
pub type ResolutionResult<T> = Result<T, ResolutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_display() {
        let id = RunId::new();
        assert_eq!(format!("{}", id).len(), 8);
    }

    #[test]
    fn test_skip_message_uses_file_name() {
        let failure = ArtifactFailure::new(ArtifactRef::new("/configs/0001.yaml"), "Boom!");
        assert_eq!(
            failure.skip_message(),
            "Error 'Boom!' occurred while running config file 0001.yaml. Skipping it for now."
        );
    }

    #[test]
    fn test_validation_exception_message() {
        let error = ValidationException::new(vec![ArtifactFailure::new(
            ArtifactRef::new("a.yaml"),
            "bad",
        )]);
        assert_eq!(error.to_string(), AGGREGATED_FAILURE_MESSAGE);
        assert_eq!(error.failure_count(), 1);
    }

    #[test]
    fn test_exit_codes() {
        let validation: RunnerError = ValidationException::new(Vec::new()).into();
        assert_eq!(validation.exit_code(), 1);

        let resolution: RunnerError = ResolutionError::NoTarget.into();
        assert_eq!(resolution.exit_code(), 2);
    }
}
