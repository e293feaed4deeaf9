//! Artifact references and the ordinal naming convention.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Minimum width of the zero-padded ordinal in shard artifact names.
pub const DEFAULT_INDEX_WIDTH: usize = 4;

/// A single resolved path to one configuration artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactRef(PathBuf);

impl ArtifactRef {
    /// Create a reference from any path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Full path of the artifact.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// File name of the artifact, falling back to the full path when the
    /// path has no final component.
    pub fn name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }

    /// File name without its extension.
    pub fn stem(&self) -> Option<String> {
        self.0.file_stem().map(|s| s.to_string_lossy().into_owned())
    }

    /// Consume the reference, returning the path.
    pub fn into_path(self) -> PathBuf {
        self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for ArtifactRef {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for ArtifactRef {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for ArtifactRef {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

impl From<&str> for ArtifactRef {
    fn from(path: &str) -> Self {
        Self(PathBuf::from(path))
    }
}

/// Number of decimal digits needed to print `value`.
fn digits(value: usize) -> usize {
    let mut n = value;
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

/// Width of the ordinal token for a directory holding `count` artifacts.
///
/// Never narrower than `min_width`; grows when the largest index needs more
/// digits.
pub fn index_width(count: usize, min_width: usize) -> usize {
    let largest = count.saturating_sub(1);
    digits(largest).max(min_width)
}

/// Zero-padded ordinal token for `index`, e.g. `2 -> "0002"` at width 4.
pub fn index_token(index: usize, width: usize) -> String {
    format!("{:0width$}", index, width = width)
}
