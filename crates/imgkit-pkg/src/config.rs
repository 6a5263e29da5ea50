//! Build configuration consumed by the package manager backends

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PackageError;
use crate::types::PackageManagerType;

/// Target distribution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    #[default]
    Debian,
    Ubuntu,
    Opensuse,
}

impl Distribution {
    /// Native package manager family of this distribution
    #[must_use]
    pub fn package_manager(self) -> PackageManagerType {
        match self {
            Distribution::Debian | Distribution::Ubuntu => PackageManagerType::Apt,
            Distribution::Opensuse => PackageManagerType::Zypper,
        }
    }
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distribution::Debian => write!(f, "debian"),
            Distribution::Ubuntu => write!(f, "ubuntu"),
            Distribution::Opensuse => write!(f, "opensuse"),
        }
    }
}

/// A host directory exposed to package manager scripts under `/work/src`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSource {
    /// Host path
    pub source: PathBuf,
    /// Path below `/work/src`
    #[serde(default)]
    pub target: PathBuf,
}

/// Resolved build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Target distribution
    #[serde(default)]
    pub distribution: Distribution,
    /// Distribution release (suite for Debian-family)
    #[serde(default = "default_release")]
    pub release: String,
    /// Architecture, spelled the way the target distribution spells it
    #[serde(default = "default_architecture")]
    pub architecture: String,
    /// Install documentation
    #[serde(default)]
    pub with_docs: bool,
    /// Install recommended packages
    #[serde(default)]
    pub with_recommends: bool,
    /// Verify repository signatures
    #[serde(default = "default_repository_key_check")]
    pub repository_key_check: bool,
    /// Locale to restrict installed translations to (rpm only)
    #[serde(default)]
    pub locale: Option<String>,
    /// Environment passed to every package manager invocation
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    /// Tree providing the tools run inside the sandbox
    #[serde(default)]
    pub tools_tree: Option<PathBuf>,
    /// Source trees mounted for package manager scripts
    #[serde(default)]
    pub build_sources: Vec<BuildSource>,
}

fn default_release() -> String {
    "stable".to_string()
}

fn default_architecture() -> String {
    "amd64".to_string()
}

fn default_repository_key_check() -> bool {
    true
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            distribution: Distribution::default(),
            release: default_release(),
            architecture: default_architecture(),
            with_docs: false,
            with_recommends: false,
            repository_key_check: default_repository_key_check(),
            locale: None,
            environment: BTreeMap::new(),
            tools_tree: None,
            build_sources: Vec::new(),
        }
    }
}

impl BuildConfig {
    /// Parse configuration from TOML
    ///
    /// # Errors
    /// Returns `PackageError::ConfigError` if the document is invalid
    pub fn from_toml(content: &str) -> Result<Self, PackageError> {
        toml::from_str(content).map_err(|e| PackageError::ConfigError(e.to_string()))
    }

    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, PackageError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PackageError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuildConfig::from_toml("").unwrap();

        assert_eq!(config.distribution, Distribution::Debian);
        assert_eq!(config.release, "stable");
        assert_eq!(config.architecture, "amd64");
        assert!(!config.with_docs);
        assert!(!config.with_recommends);
        assert!(config.repository_key_check);
        assert!(config.environment.is_empty());
    }

    #[test]
    fn test_parse_full() {
        let config = BuildConfig::from_toml(
            r#"
distribution = "opensuse"
release = "tumbleweed"
architecture = "x86_64"
with_docs = true
repository_key_check = false
locale = "en_US.UTF-8"
tools_tree = "/var/tmp/tools"

[environment]
SOURCE_DATE_EPOCH = "0"

[[build_sources]]
source = "/home/user/project"
target = "project"
"#,
        )
        .unwrap();

        assert_eq!(config.distribution.package_manager(), PackageManagerType::Zypper);
        assert_eq!(config.distribution.to_string(), "opensuse");
        assert!(config.with_docs);
        assert!(!config.repository_key_check);
        assert_eq!(config.environment["SOURCE_DATE_EPOCH"], "0");
        assert_eq!(config.build_sources[0].target, PathBuf::from("project"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = BuildConfig::from_toml("with_docs = \"maybe\"").unwrap_err();
        assert!(matches!(err, PackageError::ConfigError(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = BuildConfig::load(Path::new("/nonexistent/imgkit.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/imgkit.toml"));
    }
}
