//! Core types and traits for the config runner.
//!
//! This module contains the foundational pieces shared by resolution and
//! execution:
//! - The execution request and shard index
//! - Artifact references and the ordinal naming convention
//! - Collaborator traits and the execution context
//! - Settings and error types

pub mod artifact;
pub mod collaborator;
pub mod context;
pub mod error;
pub mod request;
pub mod settings;
pub mod shard;

// Re-export commonly used types
pub use artifact::ArtifactRef;
pub use collaborator::{ConfigBuilder, ValidationEngine};
pub use context::ExecutionContext;
pub use error::{ArtifactFailure, ResolutionError, RunnerError, ValidationException};
pub use request::{ExecutionRequest, LogLevel};
pub use settings::RunnerSettings;
pub use shard::ShardIndex;
