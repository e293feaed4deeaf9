//! Resolution of an execution request into artifacts.
//!
//! Resolution runs before anything executes so that missing targets or a
//! bad shard index fail the invocation immediately.

pub mod misconfig;
pub mod resolver;

pub use misconfig::{check, Misconfiguration};
pub use resolver::{ArtifactResolver, ExecutionMode, Resolution};
