//! # Config Runner - Batch Execution for Data Validation
//!
//! Config Runner decides which validation config artifacts a process must
//! run, runs each one through a validation engine, and reports a single
//! aggregated failure once the whole batch has been attempted.
//!
//! ## Features
//!
//! - **Three targeting modes**: a single file, a whole directory, or one
//!   file of a directory picked by the shard index of an indexed job
//! - **Failure isolation**: one broken artifact never stops the others
//! - **Advisory checks**: flags that do not fit the resolved mode are
//!   reported as warnings, never as errors
//! - **Pluggable collaborators**: config building and validation are
//!   traits, with a YAML builder and a dry-run engine bundled
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use config_runner::prelude::*;
//!
//! let request = ExecutionRequest::builder()
//!     .config_dir("configs/")
//!     .kube_completions(true)
//!     .dry_run(true)
//!     .build();
//!
//! let shard = ShardIndex::for_request(&request, DEFAULT_SHARD_ENV_VAR)?;
//! let mut runner = ConfigRunner::new(YamlConfigBuilder::new(), DryRunEngine::new())
//!     .with_shard_index(shard);
//!
//! let summary = runner.run(&request)?;
//! println!("{} artifact(s) validated", summary.outcome.attempted());
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Request, shard index, artifacts, settings, collaborator traits and errors
//! - [`resolution`]: Artifact resolution and misconfiguration checks
//! - [`execution`]: Batch executor, failure aggregation, observers and the runner
//! - [`adapters`]: Bundled YAML builder and dry-run engine
//!
//! ## Plugging In an Engine
//!
//! Implement [`ValidationEngine`](core::collaborator::ValidationEngine) for
//! the config type your builder produces:
//!
//! ```rust,ignore
//! use config_runner::prelude::*;
//!
//! struct MyEngine;
//!
//! impl ValidationEngine<ValidationConfig> for MyEngine {
//!     fn run(&self, ctx: &ExecutionContext, configs: &[ValidationConfig]) -> anyhow::Result<()> {
//!         for config in configs {
//!             // Compare source and target...
//!         }
//!         Ok(())
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod core;
pub mod execution;
pub mod resolution;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use config_runner::prelude::*;
/// ```
pub mod prelude {
    // Request and shard context
    pub use crate::core::request::{ExecutionRequest, ExecutionRequestBuilder, LogLevel};
    pub use crate::core::shard::{ShardIndex, DEFAULT_SHARD_ENV_VAR};

    // Artifacts
    pub use crate::core::artifact::{index_token, index_width, ArtifactRef, DEFAULT_INDEX_WIDTH};

    // Collaborators
    pub use crate::core::collaborator::{ConfigBuilder, FnBuilder, FnEngine, ValidationEngine};
    pub use crate::core::context::ExecutionContext;

    // Settings
    pub use crate::core::settings::RunnerSettings;

    // Errors
    pub use crate::core::error::{
        ArtifactFailure, BuildError, EngineError, ResolutionError, RunId, RunnerError,
        RunnerResult, SettingsError, ValidationException, AGGREGATED_FAILURE_MESSAGE,
    };

    // Resolution
    pub use crate::resolution::{check, ArtifactResolver, ExecutionMode, Misconfiguration, Resolution};

    // Execution
    pub use crate::execution::{
        BatchExecutor, BatchOutcome, ConfigRunner, FailureAggregator, LogObserver, ObserverSet,
        RecordingObserver, RunEvent, RunObserver, RunSummary, RunnerState,
    };

    // Bundled collaborators
    pub use crate::adapters::{DryRunEngine, ValidationConfig, YamlConfigBuilder};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
