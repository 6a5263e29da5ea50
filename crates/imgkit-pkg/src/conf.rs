//! Native configuration file records
//!
//! Each generated file has a small record type rendered by a formatter that
//! reproduces the package manager's syntax exactly. Values are validated
//! before rendering so that a stray newline cannot inject extra settings.

use crate::error::PackageError;

/// Reject values that would break the line-oriented file formats
fn check_value(key: &str, value: &str) -> Result<(), PackageError> {
    if value.contains(['\n', '\r']) {
        return Err(PackageError::ConfigError(format!(
            "value for {key} contains a line break: {value:?}"
        )));
    }
    Ok(())
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

/// Workspace-local `apt.conf` read through `APT_CONFIG`
///
/// apt parses command line options after its configuration files, so the
/// configuration directory can only be moved through this file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AptConf {
    /// Value of `Dir::Etc`, relative to `Dir`
    pub dir_etc: String,
}

impl AptConf {
    pub fn new(dir_etc: impl Into<String>) -> Self {
        Self {
            dir_etc: dir_etc.into(),
        }
    }

    /// Render the file
    ///
    /// # Errors
    /// Returns `PackageError::ConfigError` if the value cannot be quoted
    pub fn render(&self) -> Result<String, PackageError> {
        check_value("Dir::Etc", &self.dir_etc)?;
        if self.dir_etc.contains('"') {
            return Err(PackageError::ConfigError(format!(
                "Dir::Etc cannot contain a quote: {:?}",
                self.dir_etc
            )));
        }
        Ok(format!("Dir::Etc \"{}\";\n", self.dir_etc))
    }
}

/// One-line-style `sources.list`, one entry per line
///
/// # Errors
/// Returns `PackageError::ConfigError` if an entry spans several lines
pub fn render_sources_list(entries: &[String]) -> Result<String, PackageError> {
    let mut out = String::new();
    for entry in entries {
        check_value("sources.list", entry)?;
        out.push_str(entry);
        out.push('\n');
    }
    Ok(out)
}

/// deb822 `.sources` stanza
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebSources {
    pub enabled: bool,
    pub types: Vec<String>,
    pub uris: Vec<String>,
    pub suites: Vec<String>,
    pub components: Vec<String>,
    pub trusted: bool,
}

impl DebSources {
    /// Trusted `deb` source with a single URI, suite and `main` component
    pub fn trusted_local(uri: impl Into<String>, suite: impl Into<String>) -> Self {
        Self {
            enabled: true,
            types: vec!["deb".to_string()],
            uris: vec![uri.into()],
            suites: vec![suite.into()],
            components: vec!["main".to_string()],
            trusted: true,
        }
    }

    /// Render the stanza
    ///
    /// # Errors
    /// Returns `PackageError::ConfigError` if a field spans several lines
    pub fn render(&self) -> Result<String, PackageError> {
        let fields = [
            ("Enabled", yes_no(self.enabled).to_string()),
            ("Types", self.types.join(" ")),
            ("URIs", self.uris.join(" ")),
            ("Suites", self.suites.join(" ")),
            ("Components", self.components.join(" ")),
            ("Trusted", yes_no(self.trusted).to_string()),
        ];

        let mut out = String::new();
        for (key, value) in &fields {
            check_value(key, value)?;
            out.push_str(&format!("{key}: {value}\n"));
        }
        Ok(out)
    }
}

/// A `[section]` of a zypper `.repo` file
///
/// Lines keep insertion order. Signing keys go last: the first as
/// `gpgkey=<url>`, the rest on continuation lines aligned under the first URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStanza {
    pub id: String,
    pub lines: Vec<String>,
    pub gpgkeys: Vec<String>,
}

impl RepoStanza {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            lines: Vec::new(),
            gpgkeys: Vec::new(),
        }
    }

    /// Append a `key=value` entry
    #[must_use]
    pub fn entry(self, key: &str, value: impl std::fmt::Display) -> Self {
        self.raw_line(format!("{key}={value}"))
    }

    /// Append a line verbatim, such as a caller-supplied `baseurl=...`
    #[must_use]
    pub fn raw_line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Set signing key URLs
    #[must_use]
    pub fn with_gpgkeys(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.gpgkeys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Render the stanza
    ///
    /// # Errors
    /// Returns `PackageError::ConfigError` on an invalid id or multi-line value
    pub fn render(&self) -> Result<String, PackageError> {
        check_value("repository id", &self.id)?;
        if self.id.is_empty() || self.id.contains(['[', ']']) {
            return Err(PackageError::ConfigError(format!(
                "invalid repository id: {:?}",
                self.id
            )));
        }

        let mut out = format!("[{}]\n", self.id);
        for line in &self.lines {
            check_value("repository entry", line)?;
            out.push_str(line);
            out.push('\n');
        }

        const GPGKEY: &str = "gpgkey=";
        for (i, url) in self.gpgkeys.iter().enumerate() {
            check_value("gpgkey", url)?;
            if i == 0 {
                out.push_str(GPGKEY);
            } else {
                out.push_str(&" ".repeat(GPGKEY.len()));
            }
            out.push_str(url);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Tuning block appended to `zypp.conf`
///
/// `rpm.install.excludedocs` can only be set in `zypp.conf`, so the block is
/// appended to whatever the file already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZyppTuning {
    pub exclude_docs: bool,
    /// Minutes between repository metadata refreshes
    pub refresh_delay: u32,
}

impl ZyppTuning {
    /// 48 hours
    pub const DEFAULT_REFRESH_DELAY: u32 = 48 * 60;

    #[must_use]
    pub fn new(exclude_docs: bool) -> Self {
        Self {
            exclude_docs,
            refresh_delay: Self::DEFAULT_REFRESH_DELAY,
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "\n[main]\nrpm.install.excludedocs = {}\nrepo.refresh.delay = {}\n",
            yes_no(self.exclude_docs),
            self.refresh_delay
        )
    }
}
