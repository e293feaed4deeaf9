//! Shard context supplied by an orchestrating job scheduler.
//!
//! An indexed parallel job launches one process per ordinal and exports the
//! ordinal through an environment variable. The index is read once at
//! startup and passed into the runner as a plain value.

use crate::core::error::ResolutionError;
use crate::core::request::ExecutionRequest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable set by Kubernetes indexed Jobs.
pub const DEFAULT_SHARD_ENV_VAR: &str = "JOB_COMPLETION_INDEX";

/// Position of this process among the replicas of an indexed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShardIndex(usize);

impl ShardIndex {
    /// Wrap an ordinal.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The 0-based ordinal.
    pub fn get(self) -> usize {
        self.0
    }

    /// Parse a raw environment value. Surrounding whitespace is ignored.
    pub fn parse(var: &str, raw: &str) -> Result<Self, ResolutionError> {
        raw.trim()
            .parse::<usize>()
            .map(Self)
            .map_err(|_| ResolutionError::InvalidShardIndex {
                var: var.to_string(),
                value: raw.to_string(),
            })
    }

    /// Read the index from the process environment.
    ///
    /// Returns `Ok(None)` when the variable is unset, which means the
    /// process is not running as an indexed shard.
    pub fn from_env(var: &str) -> Result<Option<Self>, ResolutionError> {
        Self::from_lookup(var, |name| std::env::var(name).ok())
    }

    /// Read the index through an arbitrary lookup function.
    pub fn from_lookup<F>(var: &str, lookup: F) -> Result<Option<Self>, ResolutionError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        lookup(var).map(|raw| Self::parse(var, &raw)).transpose()
    }

    /// Whether `request` asks for a shard index at all.
    ///
    /// Only an indexed directory run (`kube_completions` with a config
    /// directory and no config file) consults the scheduler; every other
    /// invocation ignores the variable even when it is set.
    pub fn wanted_by(request: &ExecutionRequest) -> bool {
        request.kube_completions()
            && request.config_dir().is_some()
            && request.config_file().is_none()
    }

    /// Read the index for `request` from the process environment.
    pub fn for_request(
        request: &ExecutionRequest,
        var: &str,
    ) -> Result<Option<Self>, ResolutionError> {
        Self::for_request_with(request, var, |name| std::env::var(name).ok())
    }

    /// Read the index for `request` through an arbitrary lookup function.
    ///
    /// The lookup is not called when the request does not want a shard.
    pub fn for_request_with<F>(
        request: &ExecutionRequest,
        var: &str,
        lookup: F,
    ) -> Result<Option<Self>, ResolutionError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        if Self::wanted_by(request) {
            Self::from_lookup(var, lookup)
        } else {
            Ok(None)
        }
    }
}

impl From<usize> for ShardIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for ShardIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
