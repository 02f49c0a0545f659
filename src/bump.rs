//! Required version bump
//!
//! A three-point severity lattice, `Patch < Minor < Major`, joined by
//! taking the maximum. `Patch` is the identity of [`RequiredBump::join`].

use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// Minimum semver increment a change requires
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RequiredBump {
    /// No observable change to the exported surface
    #[default]
    Patch,
    /// Backward-compatible addition
    Minor,
    /// Breaking change
    Major,
}

impl RequiredBump {
    /// Least upper bound of two bumps
    pub fn join(self, other: RequiredBump) -> RequiredBump {
        self.max(other)
    }

    /// Join every bump in an iterator, starting from `Patch`
    pub fn join_all(bumps: impl IntoIterator<Item = RequiredBump>) -> RequiredBump {
        bumps.into_iter().fold(RequiredBump::Patch, RequiredBump::join)
    }

    pub fn is_breaking(&self) -> bool {
        *self == RequiredBump::Major
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredBump::Patch => "patch",
            RequiredBump::Minor => "minor",
            RequiredBump::Major => "major",
        }
    }

    /// Compute the next version for this bump.
    ///
    /// Below 1.0.0 the cargo convention applies: a breaking change bumps
    /// the minor component and an addition bumps the patch component.
    pub fn apply(&self, current: &Version) -> Version {
        let (major, minor, patch) = (current.major, current.minor, current.patch);
        match (self, major) {
            (RequiredBump::Major, 0) => Version::new(0, minor + 1, 0),
            (RequiredBump::Major, _) => Version::new(major + 1, 0, 0),
            (RequiredBump::Minor, 0) => Version::new(0, minor, patch + 1),
            (RequiredBump::Minor, _) => Version::new(major, minor + 1, 0),
            (RequiredBump::Patch, _) => Version::new(major, minor, patch + 1),
        }
    }
}

impl fmt::Display for RequiredBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequiredBump {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patch" => Ok(RequiredBump::Patch),
            "minor" => Ok(RequiredBump::Minor),
            "major" => Ok(RequiredBump::Major),
            other => Err(ApiError::InvalidFormat(format!(
                "unknown bump '{}', expected patch, minor or major",
                other
            ))),
        }
    }
}
