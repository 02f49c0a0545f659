//! Module versioning utilities

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bump::RequiredBump;

/// A released version of a module's API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleVersion {
    /// Semantic version (e.g., "1.2.3")
    pub version: Version,
    /// When this version was computed
    pub created_at: DateTime<Utc>,
    /// Previous version, if this one came from a bump
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
}

impl ModuleVersion {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            created_at: Utc::now(),
            previous_version: None,
        }
    }

    /// Create from a version string, accepting a leading 'v'
    pub fn parse(version_str: &str) -> Result<Self, semver::Error> {
        let version_str = version_str.strip_prefix('v').unwrap_or(version_str);
        let version = Version::parse(version_str)?;
        Ok(Self::new(version))
    }

    /// Get the version string (e.g., "1.2.3")
    pub fn version_string(&self) -> String {
        self.version.to_string()
    }

    /// Get the tag string (e.g., "v1.2.3")
    pub fn tag_string(&self) -> String {
        format!("v{}", self.version)
    }

    /// Produce the next version required by `bump`
    pub fn bump(&self, bump: RequiredBump) -> Self {
        Self {
            version: bump.apply(&self.version),
            created_at: Utc::now(),
            previous_version: Some(self.version_string()),
        }
    }

    /// Classify the increment from `other` to `self`, if it is one
    pub fn bump_from(&self, other: &ModuleVersion) -> Option<RequiredBump> {
        let (a, b) = (&self.version, &other.version);
        if a <= b {
            return None;
        }
        if a.major > b.major || (a.major == 0 && b.major == 0 && a.minor > b.minor) {
            Some(RequiredBump::Major)
        } else if a.minor > b.minor || a.major == 0 {
            Some(RequiredBump::Minor)
        } else {
            Some(RequiredBump::Patch)
        }
    }

    /// Whether moving from `other` to `self` is a large enough increment for `required`
    pub fn satisfies(&self, other: &ModuleVersion, required: RequiredBump) -> bool {
        self.bump_from(other).is_some_and(|actual| actual >= required)
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.version)
    }
}

impl PartialEq for ModuleVersion {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for ModuleVersion {}

impl PartialOrd for ModuleVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModuleVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.version.cmp(&other.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        let v = ModuleVersion::parse("1.2.3").unwrap();
        assert_eq!(v.version_string(), "1.2.3");
        assert_eq!(v.tag_string(), "v1.2.3");
    }

    #[test]
    fn test_version_with_v_prefix() {
        let v = ModuleVersion::parse("v1.2.3").unwrap();
        assert_eq!(v.version_string(), "1.2.3");
    }

    #[test]
    fn test_version_bumps() {
        let v = ModuleVersion::parse("1.2.3").unwrap();

        let major = v.bump(RequiredBump::Major);
        assert_eq!(major.version_string(), "2.0.0");
        assert_eq!(major.previous_version.as_deref(), Some("1.2.3"));

        assert_eq!(v.bump(RequiredBump::Minor).version_string(), "1.3.0");
        assert_eq!(v.bump(RequiredBump::Patch).version_string(), "1.2.4");
    }

    #[test]
    fn test_bump_from() {
        let base = ModuleVersion::parse("1.2.3").unwrap();
        let check = |s: &str| ModuleVersion::parse(s).unwrap().bump_from(&base);

        assert_eq!(check("2.0.0"), Some(RequiredBump::Major));
        assert_eq!(check("1.3.0"), Some(RequiredBump::Minor));
        assert_eq!(check("1.2.4"), Some(RequiredBump::Patch));
        assert_eq!(check("1.2.3"), None);
        assert_eq!(check("1.0.0"), None);
    }

    #[test]
    fn test_satisfies_pre_1_0() {
        let base = ModuleVersion::parse("0.3.1").unwrap();
        let next_minor = ModuleVersion::parse("0.4.0").unwrap();
        let next_patch = ModuleVersion::parse("0.3.2").unwrap();

        assert!(next_minor.satisfies(&base, RequiredBump::Major));
        assert!(next_patch.satisfies(&base, RequiredBump::Minor));
        assert!(!next_patch.satisfies(&base, RequiredBump::Major));
    }
}
