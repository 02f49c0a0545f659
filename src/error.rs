//! Error types for api-semver
//!
//! The comparison core never fails; these errors come from the edges
//! (symbol sources, snapshot storage, configuration).

use thiserror::Error;

/// Result type for api-semver operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// api-semver errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),
}
