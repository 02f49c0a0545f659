//! Checksum utilities for snapshot integrity verification

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::Result;
use crate::item::Snapshot;

/// SHA256 checksum of a snapshot's items
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum over the compact JSON form of a snapshot.
    ///
    /// Snapshot keys are kept sorted, so equal snapshots hash equally.
    pub fn of_snapshot(snapshot: &Snapshot) -> Result<Self> {
        let canonical = serde_json::to_vec(snapshot)?;
        Ok(Self::from_bytes(&canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that a snapshot matches this checksum
    pub fn verify(&self, snapshot: &Snapshot) -> Result<bool> {
        Ok(*self == Self::of_snapshot(snapshot)?)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Checksum {
    fn from(s: String) -> Self {
        Self(s)
    }
}
