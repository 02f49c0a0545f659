//! Configuration management for api-semver
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (api-semver.toml)
//! - Environment variables (APISEMVER__*)
//!
//! ## Example config file (api-semver.toml):
//! ```toml
//! [snapshot]
//! path = "api.json"
//! output_format = "pretty"
//!
//! [compare]
//! strict = false
//! fail_on = "major"
//! ignore = ["^Internal", "Deprecated$"]
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::bump::RequiredBump;
use crate::compatibility::CompatibilityChecker;
use crate::error::Result;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSemverConfig {
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    #[serde(default)]
    pub compare: CompareConfig,
}

/// Snapshot file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Default snapshot file path
    #[serde(default = "default_snapshot_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Comparison settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Treat every change as breaking
    #[serde(default)]
    pub strict: bool,

    /// Lowest bump that makes `diff` exit unsuccessfully
    #[serde(default = "default_fail_on")]
    pub fail_on: RequiredBump,

    /// Regular expressions for top-level names to leave out of the comparison
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("api.json")
}

fn default_fail_on() -> RequiredBump {
    RequiredBump::Major
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
            output_format: OutputFormat::Pretty,
        }
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            strict: false,
            fail_on: default_fail_on(),
            ignore: Vec::new(),
        }
    }
}

impl CompareConfig {
    /// Build a checker from these settings
    pub fn checker(&self) -> Result<CompatibilityChecker> {
        let checker = CompatibilityChecker::new().ignoring(&self.ignore)?;
        Ok(if self.strict { checker.strict() } else { checker })
    }
}

impl ApiSemverConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally adding a required file
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["api-semver.toml", ".api-semver.toml", "config/api-semver.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "api-semver") {
            let xdg_config = config_dir.config_dir().join("api-semver.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("APISEMVER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = self
            .to_toml()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiSemverConfig::default();
        assert_eq!(config.snapshot.path, PathBuf::from("api.json"));
        assert_eq!(config.compare.fail_on, RequiredBump::Major);
        assert!(!config.compare.strict);
    }

    #[test]
    fn test_serialize_config() {
        let toml_str = ApiSemverConfig::default().to_toml().unwrap();
        assert!(toml_str.contains("[snapshot]"));
        assert!(toml_str.contains("[compare]"));
        assert!(toml_str.contains("fail_on = \"major\""));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[compare]\nstrict = true\nfail_on = \"minor\"\nignore = [\"^Internal\"]\n",
        )
        .unwrap();

        let config = ApiSemverConfig::load_from(path.to_str()).unwrap();
        assert!(config.compare.strict);
        assert_eq!(config.compare.fail_on, RequiredBump::Minor);
        assert_eq!(config.compare.ignore, vec!["^Internal".to_string()]);

        let checker = config.compare.checker().unwrap();
        assert!(checker.is_ignored("InternalThing"));
    }
}
