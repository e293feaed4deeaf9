//! Artifact source resolution.
//!
//! Precedence, first match wins:
//! 1. a config file is a single-file run, whatever else was passed;
//! 2. a directory plus a shard index selects one artifact by position;
//! 3. a directory alone fans out over every artifact it holds;
//! 4. nothing resolves to an empty batch.

use crate::core::artifact::{index_token, index_width, ArtifactRef};
use crate::core::error::{ResolutionError, ResolutionResult};
use crate::core::request::ExecutionRequest;
use crate::core::settings::RunnerSettings;
use crate::core::shard::ShardIndex;
use glob::MatchOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// How an invocation maps onto artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One explicitly named artifact.
    SingleFile,
    /// One artifact picked from a directory by shard index.
    IndexedDirectory,
    /// Every artifact in a directory.
    DirectoryFanout,
    /// Neither a file nor a directory was given.
    Unresolved,
}

impl ExecutionMode {
    /// Decide the mode from the request and shard context alone.
    pub fn of(request: &ExecutionRequest, shard: Option<ShardIndex>) -> Self {
        if request.config_file().is_some() {
            ExecutionMode::SingleFile
        } else if request.config_dir().is_some() {
            match shard {
                Some(_) => ExecutionMode::IndexedDirectory,
                None => ExecutionMode::DirectoryFanout,
            }
        } else {
            ExecutionMode::Unresolved
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionMode::SingleFile => "single-file",
            ExecutionMode::IndexedDirectory => "indexed-directory",
            ExecutionMode::DirectoryFanout => "directory-fanout",
            ExecutionMode::Unresolved => "unresolved",
        };
        f.write_str(name)
    }
}

/// Outcome of resolution: the mode and the ordered artifacts to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Mode that was resolved.
    pub mode: ExecutionMode,
    /// Artifacts in execution order.
    pub artifacts: Vec<ArtifactRef>,
}

impl Resolution {
    /// Number of resolved artifacts.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Resolves a request into the ordered artifacts to run.
#[derive(Debug, Clone)]
pub struct ArtifactResolver {
    patterns: Vec<glob::Pattern>,
    min_index_width: usize,
    verify_shard_names: bool,
}

impl ArtifactResolver {
    /// Create a resolver from settings.
    pub fn new(settings: &RunnerSettings) -> ResolutionResult<Self> {
        let patterns = settings
            .artifact_patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| ResolutionError::InvalidPattern {
                    pattern: p.clone(),
                    error: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            min_index_width: settings.index_width,
            verify_shard_names: settings.verify_shard_names,
        })
    }

    /// Resolve the artifacts for `request`.
    ///
    /// Reads the directory listing when a directory is involved; otherwise
    /// touches nothing on disk.
    pub fn resolve(
        &self,
        request: &ExecutionRequest,
        shard: Option<ShardIndex>,
    ) -> ResolutionResult<Resolution> {
        let mode = ExecutionMode::of(request, shard);

        let artifacts = match (mode, request.config_file(), request.config_dir(), shard) {
            (ExecutionMode::SingleFile, Some(file), _, _) => vec![ArtifactRef::from(file)],
            (ExecutionMode::IndexedDirectory, _, Some(dir), Some(index)) => {
                vec![self.select_shard(dir, index)?]
            }
            (ExecutionMode::DirectoryFanout, _, Some(dir), _) => self.list_artifacts(dir)?,
            _ => Vec::new(),
        };

        Ok(Resolution { mode, artifacts })
    }

    /// List the artifacts directly inside `dir`, sorted by file name.
    pub fn list_artifacts(&self, dir: &Path) -> ResolutionResult<Vec<ArtifactRef>> {
        if !dir.is_dir() {
            return Err(ResolutionError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut artifacts = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ResolutionError::Io {
                path: dir.to_path_buf(),
                error: e.to_string(),
            })?;

            let Some(name) = entry.file_name().to_str() else {
                log::debug!("Skipping non UTF-8 file name in {}", dir.display());
                continue;
            };

            if !self.matches(name) {
                continue;
            }

            // Symlinks count when they resolve to a regular file.
            let is_file = if entry.path_is_symlink() {
                fs::metadata(entry.path()).map(|m| m.is_file()).unwrap_or(false)
            } else {
                entry.file_type().is_file()
            };

            if is_file {
                artifacts.push(ArtifactRef::from(entry.path()));
            } else if entry.path_is_symlink() {
                log::debug!("Skipping dangling or non-file symlink {}", entry.path().display());
            }
        }

        Ok(artifacts)
    }

    /// Whether `name` is an artifact file name. Hidden files never are.
    fn matches(&self, name: &str) -> bool {
        let options = MatchOptions {
            require_literal_leading_dot: true,
            ..MatchOptions::new()
        };
        self.patterns.iter().any(|p| p.matches_with(name, options))
    }

    /// Pick the artifact at position `index` of the directory listing.
    fn select_shard(&self, dir: &Path, index: ShardIndex) -> ResolutionResult<ArtifactRef> {
        let artifacts = self.list_artifacts(dir)?;
        let count = artifacts.len();
        let position = index.get();

        let selected = artifacts.into_iter().nth(position).ok_or_else(|| {
            ResolutionError::ShardIndexOutOfRange {
                index: position,
                count,
                dir: dir.to_path_buf(),
            }
        })?;

        if self.verify_shard_names {
            let expected = index_token(position, index_width(count, self.min_index_width));
            let found = selected.stem().unwrap_or_default();
            if found != expected {
                return Err(ResolutionError::ShardNameMismatch {
                    index: position,
                    expected,
                    found: selected.name(),
                });
            }
        }

        Ok(selected)
    }
}

impl Default for ArtifactResolver {
    fn default() -> Self {
        let settings = RunnerSettings::default();
        Self {
            patterns: settings
                .artifact_patterns
                .iter()
                .filter_map(|p| glob::Pattern::new(p).ok())
                .collect(),
            min_index_width: settings.index_width,
            verify_shard_names: settings.verify_shard_names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn shard_dir(count: usize) -> TempDir {
        let dir = TempDir::new().unwrap();
        for i in 0..count {
            fs::write(dir.path().join(format!("{:04}.yaml", i)), "validations: []\n").unwrap();
        }
        dir
    }

    fn names(artifacts: &[ArtifactRef]) -> Vec<String> {
        artifacts.iter().map(|a| a.name()).collect()
    }

    #[test]
    fn test_config_file_wins() {
        let dir = shard_dir(3);
        let resolver = ArtifactResolver::default();
        let request = ExecutionRequest::builder()
            .config_file("first.yaml")
            .config_dir(dir.path())
            .kube_completions(true)
            .build();

        let resolution = resolver.resolve(&request, Some(ShardIndex::new(1))).unwrap();
        assert_eq!(resolution.mode, ExecutionMode::SingleFile);
        assert_eq!(resolution.artifacts, vec![ArtifactRef::new("first.yaml")]);
    }

    #[test]
    fn test_single_file_not_checked_on_disk() {
        let resolver = ArtifactResolver::default();
        let request = ExecutionRequest::builder()
            .config_file("/no/such/file.yaml")
            .build();

        let resolution = resolver.resolve(&request, None).unwrap();
        assert_eq!(resolution.len(), 1);
    }

    #[test]
    fn test_fanout_lists_in_name_order() {
        let dir = shard_dir(4);
        let resolver = ArtifactResolver::default();
        let request = ExecutionRequest::builder().config_dir(dir.path()).build();

        let resolution = resolver.resolve(&request, None).unwrap();
        assert_eq!(resolution.mode, ExecutionMode::DirectoryFanout);
        assert_eq!(
            names(&resolution.artifacts),
            vec!["0000.yaml", "0001.yaml", "0002.yaml", "0003.yaml"]
        );
    }

    #[test]
    fn test_fanout_filters_non_artifacts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.yml"), "").unwrap();
        fs::write(dir.path().join("a.yaml"), "").unwrap();
        fs::write(dir.path().join("README.md"), "").unwrap();
        fs::create_dir(dir.path().join("nested.yaml")).unwrap();
        fs::write(dir.path().join("nested.yaml").join("c.yaml"), "").unwrap();

        let resolver = ArtifactResolver::default();
        let artifacts = resolver.list_artifacts(dir.path()).unwrap();
        assert_eq!(names(&artifacts), vec!["a.yaml", "b.yml"]);
    }

    #[test]
    fn test_fanout_skips_hidden_files() {
        let dir = shard_dir(2);
        fs::write(dir.path().join("._0000.yaml"), "").unwrap();
        fs::write(dir.path().join(".0001.yml"), "").unwrap();

        let resolver = ArtifactResolver::default();
        let artifacts = resolver.list_artifacts(dir.path()).unwrap();
        assert_eq!(names(&artifacts), vec!["0000.yaml", "0001.yaml"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_does_not_abort_listing() {
        use std::os::unix::fs::symlink;

        let dir = shard_dir(3);
        symlink("/nonexistent/target", dir.path().join("notes.md")).unwrap();
        symlink("/nonexistent/target", dir.path().join("0003.yaml")).unwrap();

        let resolver = ArtifactResolver::default();
        let artifacts = resolver.list_artifacts(dir.path()).unwrap();
        assert_eq!(names(&artifacts), vec!["0000.yaml", "0001.yaml", "0002.yaml"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_file_is_listed() {
        use std::os::unix::fs::symlink;

        let dir = shard_dir(1);
        let outside = TempDir::new().unwrap();
        let target = outside.path().join("shared.yaml");
        fs::write(&target, "").unwrap();
        symlink(&target, dir.path().join("0001.yaml")).unwrap();

        let resolver = ArtifactResolver::default();
        let artifacts = resolver.list_artifacts(dir.path()).unwrap();
        assert_eq!(names(&artifacts), vec!["0000.yaml", "0001.yaml"]);
    }

    #[test]
    fn test_indexed_selects_by_position() {
        let dir = shard_dir(4);
        let resolver = ArtifactResolver::default();
        let request = ExecutionRequest::builder()
            .config_dir(dir.path())
            .kube_completions(true)
            .build();

        let resolution = resolver.resolve(&request, Some(ShardIndex::new(2))).unwrap();
        assert_eq!(resolution.mode, ExecutionMode::IndexedDirectory);
        assert_eq!(names(&resolution.artifacts), vec!["0002.yaml"]);
    }

    #[test]
    fn test_indexed_out_of_range() {
        let dir = shard_dir(3);
        let resolver = ArtifactResolver::default();
        let request = ExecutionRequest::builder().config_dir(dir.path()).build();

        let result = resolver.resolve(&request, Some(ShardIndex::new(3)));
        assert!(matches!(
            result,
            Err(ResolutionError::ShardIndexOutOfRange { index: 3, count: 3, .. })
        ));
    }

    #[test]
    fn test_indexed_name_mismatch() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("alpha.yaml"), "").unwrap();
        fs::write(dir.path().join("beta.yaml"), "").unwrap();
        let request = ExecutionRequest::builder().config_dir(dir.path()).build();

        let strict = ArtifactResolver::default();
        let result = strict.resolve(&request, Some(ShardIndex::new(1)));
        assert!(matches!(
            result,
            Err(ResolutionError::ShardNameMismatch { ref expected, ref found, .. })
                if expected == "0001" && found == "beta.yaml"
        ));

        let lenient =
            ArtifactResolver::new(&RunnerSettings::default().with_verify_shard_names(false))
                .unwrap();
        let resolution = lenient.resolve(&request, Some(ShardIndex::new(1))).unwrap();
        assert_eq!(names(&resolution.artifacts), vec!["beta.yaml"]);
    }

    #[test]
    fn test_indexed_custom_width() {
        let dir = TempDir::new().unwrap();
        for i in 0..3 {
            fs::write(dir.path().join(format!("{:02}.yaml", i)), "").unwrap();
        }
        let request = ExecutionRequest::builder().config_dir(dir.path()).build();
        let resolver =
            ArtifactResolver::new(&RunnerSettings::default().with_index_width(2)).unwrap();

        let resolution = resolver.resolve(&request, Some(ShardIndex::new(1))).unwrap();
        assert_eq!(names(&resolution.artifacts), vec!["01.yaml"]);
    }

    #[test]
    fn test_nothing_requested() {
        let resolver = ArtifactResolver::default();
        let request = ExecutionRequest::builder().kube_completions(true).build();

        let resolution = resolver.resolve(&request, Some(ShardIndex::new(0))).unwrap();
        assert_eq!(resolution.mode, ExecutionMode::Unresolved);
        assert!(resolution.is_empty());
    }

    #[test]
    fn test_missing_directory() {
        let resolver = ArtifactResolver::default();
        let request = ExecutionRequest::builder()
            .config_dir("/definitely/not/a/dir")
            .build();

        let result = resolver.resolve(&request, None);
        assert!(matches!(result, Err(ResolutionError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_invalid_pattern() {
        let settings = RunnerSettings::default().with_artifact_patterns(["[unclosed"]);
        assert!(matches!(
            ArtifactResolver::new(&settings),
            Err(ResolutionError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(ExecutionMode::IndexedDirectory.to_string(), "indexed-directory");
    }
}
