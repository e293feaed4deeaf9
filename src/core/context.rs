//! Execution context handed to the validation engine.
//!
//! The runner turns every resolved artifact into a single-file context,
//! regardless of whether it came from a file, a shard or a fan-out, so
//! the engine only ever sees one artifact at a time.

use crate::core::artifact::ArtifactRef;
use crate::core::error::RunId;
use crate::core::request::ExecutionRequest;
use std::path::Path;

/// Context provided to the engine for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Run this artifact belongs to.
    pub run_id: RunId,
    /// Artifact being executed.
    artifact: ArtifactRef,
    /// Position of the artifact in the batch.
    pub index: usize,
    /// Size of the batch.
    pub total: usize,
    /// Whether configs should only be rendered.
    pub dry_run: bool,
}

impl ExecutionContext {
    /// Create a context for one artifact of a request.
    pub fn new(
        run_id: RunId,
        request: &ExecutionRequest,
        artifact: ArtifactRef,
        index: usize,
        total: usize,
    ) -> Self {
        Self {
            run_id,
            artifact,
            index,
            total,
            dry_run: request.dry_run(),
        }
    }

    /// The artifact being executed.
    pub fn artifact(&self) -> &ArtifactRef {
        &self.artifact
    }

    /// The artifact as the single config file of this execution.
    pub fn config_file(&self) -> Option<&Path> {
        Some(self.artifact.path())
    }

    /// Always `None`: directory targets are expanded before execution.
    pub fn config_dir(&self) -> Option<&Path> {
        None
    }
}
