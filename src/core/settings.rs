//! Runner settings loaded from an optional TOML file.
//!
//! ```toml
//! shard_env_var = "JOB_COMPLETION_INDEX"
//! artifact_patterns = ["*.yaml", "*.yml"]
//! index_width = 4
//! verify_shard_names = true
//! ```

use crate::core::artifact::DEFAULT_INDEX_WIDTH;
use crate::core::error::SettingsError;
use crate::core::shard::DEFAULT_SHARD_ENV_VAR;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for artifact resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerSettings {
    /// Environment variable holding the shard index.
    pub shard_env_var: String,
    /// Filename globs an artifact must match to be listed from a directory.
    pub artifact_patterns: Vec<String>,
    /// Minimum width of the zero-padded ordinal in shard artifact names.
    pub index_width: usize,
    /// Reject a shard selection whose file is not named after its ordinal.
    pub verify_shard_names: bool,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            shard_env_var: DEFAULT_SHARD_ENV_VAR.to_string(),
            artifact_patterns: vec!["*.yaml".to_string(), "*.yml".to_string()],
            index_width: DEFAULT_INDEX_WIDTH,
            verify_shard_names: true,
        }
    }
}

impl RunnerSettings {
    /// Create default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Load settings when a path is given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.shard_env_var.trim().is_empty() {
            return Err(SettingsError::Invalid {
                key: "shard_env_var".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.artifact_patterns.is_empty() {
            return Err(SettingsError::Invalid {
                key: "artifact_patterns".to_string(),
                reason: "at least one pattern is required".to_string(),
            });
        }
        if self.index_width == 0 {
            return Err(SettingsError::Invalid {
                key: "index_width".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Set the shard environment variable.
    pub fn with_shard_env_var(mut self, var: impl Into<String>) -> Self {
        self.shard_env_var = var.into();
        self
    }

    /// Replace the artifact patterns.
    pub fn with_artifact_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artifact_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the minimum index width.
    pub fn with_index_width(mut self, width: usize) -> Self {
        self.index_width = width;
        self
    }

    /// Enable or disable shard name verification.
    pub fn with_verify_shard_names(mut self, verify: bool) -> Self {
        self.verify_shard_names = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = RunnerSettings::default();
        assert_eq!(settings.shard_env_var, "JOB_COMPLETION_INDEX");
        assert_eq!(settings.index_width, 4);
        assert!(settings.verify_shard_names);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings =
            RunnerSettings::from_toml_str("index_width = 6\n", Path::new("runner.toml")).unwrap();
        assert_eq!(settings.index_width, 6);
        assert_eq!(settings.artifact_patterns, vec!["*.yaml", "*.yml"]);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = RunnerSettings::from_toml_str("parallel = true\n", Path::new("runner.toml"));
        assert!(matches!(result, Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = RunnerSettings::from_toml_str("index_width = 0\n", Path::new("runner.toml"));
        assert!(matches!(result, Err(SettingsError::Invalid { ref key, .. }) if key == "index_width"));

        let result =
            RunnerSettings::from_toml_str("artifact_patterns = []\n", Path::new("runner.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "shard_env_var = \"SHARD\"").unwrap();
        writeln!(file, "verify_shard_names = false").unwrap();

        let settings = RunnerSettings::load(file.path()).unwrap();
        assert_eq!(settings.shard_env_var, "SHARD");
        assert!(!settings.verify_shard_names);
    }

    #[test]
    fn test_missing_file() {
        let result = RunnerSettings::load(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(SettingsError::Read { .. })));
        assert_eq!(RunnerSettings::load_or_default(None).unwrap(), RunnerSettings::default());
    }
}
