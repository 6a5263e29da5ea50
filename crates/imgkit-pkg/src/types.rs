//! Type definitions for package management

use std::collections::BTreeSet;

use imgkit_exec::Mount;
use serde::{Deserialize, Serialize};

/// Package manager type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageManagerType {
    /// APT (Debian/Ubuntu)
    Apt,
    /// Zypper (openSUSE)
    Zypper,
}

impl std::fmt::Display for PackageManagerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageManagerType::Apt => write!(f, "apt"),
            PackageManagerType::Zypper => write!(f, "zypper"),
        }
    }
}

/// Deduplicated, sorted set of package names
///
/// Iteration order is lexicographic regardless of insertion order, so command
/// lines built from a set are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSet(BTreeSet<String>);

impl PackageSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of packages
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Package names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PackageSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// One package manager request: `install`, `remove`, `update`, ...
#[derive(Debug, Clone)]
pub struct Operation {
    /// Front-end binary for managers that ship several (`apt-get`, `apt-cache`)
    pub command: Option<String>,
    /// Verb passed to the package manager
    pub verb: String,
    /// Packages to operate on
    pub packages: PackageSet,
    /// Extra options placed after the verb
    pub options: Vec<String>,
    /// Extra mounts supplied by the caller
    pub mounts: Vec<Mount>,
    /// Attach proc/sys/dev stand-ins to the target root
    pub apivfs: bool,
}

impl Operation {
    /// Create an operation for `verb` with no packages
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            command: None,
            verb: verb.into(),
            packages: PackageSet::new(),
            options: Vec::new(),
            mounts: Vec::new(),
            apivfs: true,
        }
    }

    /// Set the front-end command
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Set the packages
    #[must_use]
    pub fn with_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages = packages.into_iter().collect();
        self
    }

    /// Set extra options
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Add extra mounts
    #[must_use]
    pub fn with_mounts(mut self, mounts: impl IntoIterator<Item = Mount>) -> Self {
        self.mounts.extend(mounts);
        self
    }

    /// Do not attach the virtual filesystem layer
    #[must_use]
    pub fn without_apivfs(mut self) -> Self {
        self.apivfs = false;
        self
    }
}

/// An RPM repository definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpmRepository {
    /// Repository identifier, also used as display name
    pub id: String,
    /// Source line written as given: `baseurl=...`, `mirrorlist=...` or `metalink=...`
    pub url: String,
    /// Signing key URLs
    #[serde(default)]
    pub gpgurls: Vec<String>,
    /// Whether the repository is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl RpmRepository {
    /// Create an enabled repository without signing keys
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            gpgurls: Vec::new(),
            enabled: true,
        }
    }

    /// Add a signing key URL
    #[must_use]
    pub fn with_gpgurl(mut self, url: impl Into<String>) -> Self {
        self.gpgurls.push(url.into());
        self
    }

    /// Set enabled flag
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
