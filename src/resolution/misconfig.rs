//! Misconfiguration detection.
//!
//! Flags that do not fit the resolved mode are reported, never enforced.

use crate::core::request::ExecutionRequest;
use crate::resolution::resolver::ExecutionMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An advisory warning about the requested flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Misconfiguration {
    /// Indexed-job flag combined with an explicit config file.
    KubeCompletionsWithConfigFile,
    /// Indexed-job flag without a shard index in the environment.
    KubeCompletionsWithoutShardIndex,
}

impl Misconfiguration {
    /// Operator-facing warning text.
    pub fn message(&self) -> &'static str {
        match self {
            Misconfiguration::KubeCompletionsWithConfigFile => {
                "--kube-completions or -kc specified, which requires a config directory, however a specific config file is provided."
            }
            Misconfiguration::KubeCompletionsWithoutShardIndex => {
                "--kube-completions or -kc specified, however not running in Kubernetes Job completion, check your command line."
            }
        }
    }
}

impl fmt::Display for Misconfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Inspect the resolved mode against the request's flags.
pub fn check(mode: ExecutionMode, request: &ExecutionRequest) -> Vec<Misconfiguration> {
    let mut warnings = Vec::new();

    if request.kube_completions() {
        match mode {
            ExecutionMode::SingleFile => {
                warnings.push(Misconfiguration::KubeCompletionsWithConfigFile)
            }
            ExecutionMode::DirectoryFanout => {
                warnings.push(Misconfiguration::KubeCompletionsWithoutShardIndex)
            }
            ExecutionMode::IndexedDirectory | ExecutionMode::Unresolved => {}
        }
    }

    warnings
}
