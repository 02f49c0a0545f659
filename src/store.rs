//! Snapshot storage
//!
//! A snapshot is persisted as a single JSON document carrying the module
//! name, an optional released version and a checksum over its items.
//! Loading verifies the checksum. A baseline can also be read from any git
//! revision without checking it out.

use chrono::{DateTime, Utc};
use git2::Repository;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::checksum::Checksum;
use crate::config::OutputFormat;
use crate::error::{ApiError, Result};
use crate::item::Snapshot;

/// On-disk form of a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub module: String,
    /// Version the snapshot was released as, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    pub created_at: DateTime<Utc>,
    pub checksum: Checksum,
    pub items: Snapshot,
}

impl SnapshotFile {
    pub fn new(module: impl Into<String>, items: Snapshot) -> Result<Self> {
        Ok(Self {
            module: module.into(),
            version: None,
            created_at: Utc::now(),
            checksum: Checksum::of_snapshot(&items)?,
            items,
        })
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn to_json(&self, format: OutputFormat) -> Result<String> {
        let text = match format {
            OutputFormat::Pretty => serde_json::to_string_pretty(self)?,
            OutputFormat::Compact => serde_json::to_string(self)?,
        };
        Ok(text)
    }

    /// Parse a snapshot document and verify its checksum
    pub fn from_json(content: &str) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(content)?;
        let actual = Checksum::of_snapshot(&file.items)?;
        if actual != file.checksum {
            return Err(ApiError::ChecksumMismatch {
                expected: file.checksum.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(file)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ApiError::SnapshotNotFound(path.display().to_string()),
            _ => ApiError::Io(e),
        })?;
        tracing::debug!(path = %path.display(), "loaded snapshot file");
        Self::from_json(&content)
    }

    pub fn save(&self, path: impl AsRef<Path>, format: OutputFormat) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json(format)?)?;
        tracing::info!(path = %path.display(), items = self.items.len(), "wrote snapshot file");
        Ok(())
    }

    /// Read the snapshot stored at `file` (relative to the repository root)
    /// as of git revision `rev`.
    pub fn load_from_git(repo: impl AsRef<Path>, rev: &str, file: &str) -> Result<Self> {
        let repo = Repository::discover(repo.as_ref())?;
        let spec = format!("{}:{}", rev, file.trim_start_matches("./"));
        let object = repo
            .revparse_single(&spec)
            .map_err(|_| ApiError::SnapshotNotFound(spec.clone()))?;
        let blob = object.peel_to_blob()?;
        let content = std::str::from_utf8(blob.content())
            .map_err(|e| ApiError::InvalidFormat(format!("{}: {}", spec, e)))?;
        tracing::debug!(%spec, "loaded snapshot from git");
        Self::from_json(content)
    }
}
