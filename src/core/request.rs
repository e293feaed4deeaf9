//! The immutable execution request built from command-line input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Log verbosity requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Everything, including per-artifact progress.
    Debug,
    /// Run start and completion.
    #[default]
    Info,
    /// Misconfigurations and skipped artifacts only.
    Warning,
    /// Fatal errors only.
    Error,
}

impl LogLevel {
    /// Filter to hand to the logger backend.
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// What one process invocation was asked to run.
///
/// Constructed once and never mutated; `config_file` and `config_dir` are
/// expected to be mutually exclusive but both or neither may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    config_file: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    kube_completions: bool,
    dry_run: bool,
    log_level: LogLevel,
    verbose: bool,
}

impl ExecutionRequest {
    /// Start building a request.
    pub fn builder() -> ExecutionRequestBuilder {
        ExecutionRequestBuilder::default()
    }

    /// Single artifact to run, if one was given.
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Directory of artifacts to run, if one was given.
    pub fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }

    /// Whether indexed-shard mode was requested.
    pub fn kube_completions(&self) -> bool {
        self.kube_completions
    }

    /// Whether configs should only be rendered, not executed.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Requested log level.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Whether verbose output was requested.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Effective logger filter: verbose always means debug.
    pub fn log_filter(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            self.log_level.to_filter()
        }
    }
}

/// Builder for [`ExecutionRequest`].
#[derive(Debug, Clone, Default)]
pub struct ExecutionRequestBuilder {
    request: ExecutionRequest,
}

impl ExecutionRequestBuilder {
    /// Set the single artifact to run.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.config_file = Some(path.into());
        self
    }

    /// Set the artifact directory to run.
    pub fn config_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.config_dir = Some(path.into());
        self
    }

    /// Request indexed-shard mode.
    pub fn kube_completions(mut self, enabled: bool) -> Self {
        self.request.kube_completions = enabled;
        self
    }

    /// Render configs without executing them.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.request.dry_run = enabled;
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.request.log_level = level;
        self
    }

    /// Enable verbose output.
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.request.verbose = enabled;
        self
    }

    /// Finish building.
    pub fn build(self) -> ExecutionRequest {
        self.request
    }
}
