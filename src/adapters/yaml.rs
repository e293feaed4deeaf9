//! YAML config builder.
//!
//! Reads the validation file layout used by the data-validation tool:
//!
//! ```yaml
//! source: my_source_conn
//! target: my_target_conn
//! result_handler:
//!   type: BigQuery
//!   table_id: project.dataset.results
//! validations:
//!   - type: Column
//!     schema_name: my_schema
//!     table_name: my_table
//! ```
//!
//! Every entry under `validations` becomes one [`ValidationConfig`] that
//! inherits the file's connections and result handler. Connections are
//! referenced by name only; nothing is opened here.

use crate::core::artifact::ArtifactRef;
use crate::core::collaborator::ConfigBuilder;
use crate::core::error::BuildError;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

/// One executable validation built from an artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationConfig {
    /// Artifact the validation was read from.
    pub artifact: ArtifactRef,
    /// Position of the validation inside the artifact.
    pub index: usize,
    /// Source connection name.
    pub source: String,
    /// Target connection name.
    pub target: String,
    /// Result handler settings shared by every validation of the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_handler: Option<Value>,
    /// The validation body, passed through untouched.
    pub validation: Value,
}

impl ValidationConfig {
    /// The validation's `type` field, e.g. `Column` or `Row`.
    pub fn validation_type(&self) -> Option<&str> {
        self.validation.get("type").and_then(Value::as_str)
    }

    /// Fully qualified table the validation targets, when present.
    pub fn table(&self) -> Option<String> {
        let table = self.validation.get("table_name").and_then(Value::as_str)?;
        match self.validation.get("schema_name").and_then(Value::as_str) {
            Some(schema) => Some(format!("{}.{}", schema, table)),
            None => Some(table.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValidationFile {
    source: String,
    target: String,
    #[serde(default)]
    result_handler: Option<Value>,
    #[serde(default)]
    validations: Vec<Value>,
}

/// Builds [`ValidationConfig`]s from YAML files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlConfigBuilder;

impl YamlConfigBuilder {
    /// Create a builder.
    pub fn new() -> Self {
        Self
    }

    /// Parse YAML text that was read from `artifact`.
    pub fn parse(
        &self,
        artifact: &ArtifactRef,
        text: &str,
    ) -> Result<Vec<ValidationConfig>, BuildError> {
        let file: ValidationFile =
            serde_yaml_ng::from_str(text).map_err(|source| BuildError::Parse {
                path: artifact.path().to_path_buf(),
                source,
            })?;

        if file.validations.is_empty() {
            return Err(BuildError::NoValidations {
                path: artifact.path().to_path_buf(),
            });
        }

        Ok(file
            .validations
            .into_iter()
            .enumerate()
            .map(|(index, validation)| ValidationConfig {
                artifact: artifact.clone(),
                index,
                source: file.source.clone(),
                target: file.target.clone(),
                result_handler: file.result_handler.clone(),
                validation,
            })
            .collect())
    }

    /// Read and parse `artifact`.
    pub fn load(&self, artifact: &ArtifactRef) -> Result<Vec<ValidationConfig>, BuildError> {
        let text = std::fs::read_to_string(artifact.path()).map_err(|source| BuildError::Read {
            path: artifact.path().to_path_buf(),
            source,
        })?;
        self.parse(artifact, &text)
    }
}

impl ConfigBuilder for YamlConfigBuilder {
    type Config = ValidationConfig;

    fn build(&self, artifact: &ArtifactRef) -> anyhow::Result<Vec<ValidationConfig>> {
        let configs = self.load(artifact)?;
        log::debug!(
            "Built {} validation(s) from {}",
            configs.len(),
            artifact.name()
        );
        Ok(configs)
    }
}
