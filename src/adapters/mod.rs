//! Bundled collaborators.
//!
//! A YAML config builder and a dry-run engine, enough to drive the runner
//! end to end without a real validation backend.

pub mod dry_run;
pub mod yaml;

pub use dry_run::DryRunEngine;
pub use yaml::{ValidationConfig, YamlConfigBuilder};
