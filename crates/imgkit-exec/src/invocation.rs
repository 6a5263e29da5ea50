//! Invocation model: what to run, with which mounts, and how

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A bind mount from the host into the sandbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    /// Host path
    pub source: PathBuf,
    /// Path inside the sandbox
    pub target: PathBuf,
    /// Whether the mount is read-only
    pub read_only: bool,
}

impl Mount {
    /// Read-write bind mount
    pub fn bind(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            read_only: false,
        }
    }

    /// Read-only bind mount
    pub fn ro_bind(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            read_only: true,
        }
    }

    /// Bind a host path at the same location inside the sandbox
    pub fn identity(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::bind(path, path)
    }

    /// Render as bubblewrap arguments
    #[must_use]
    pub fn to_args(&self) -> [String; 3] {
        let flag = if self.read_only { "--ro-bind" } else { "--bind" };
        [
            flag.to_string(),
            self.source.display().to_string(),
            self.target.display().to_string(),
        ]
    }
}

/// Everything needed to run one command inside the sandbox.
///
/// Built fresh for every call. Ephemeral source mounts can change between
/// calls, so a spec is never cached or reused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationSpec {
    /// Argument vector, program first
    pub argv: Vec<String>,
    /// Mounts applied in order, later mounts shadow earlier ones
    pub mounts: Vec<Mount>,
    /// Whether the sandbox shares the host network namespace
    pub network: bool,
    /// Extra environment for the process
    pub env: BTreeMap<String, String>,
    /// Working directory inside the sandbox
    pub chdir: Option<PathBuf>,
    /// Root to attach proc/sys/dev/run stand-ins under
    pub apivfs: Option<PathBuf>,
    /// Capture stdout into the result instead of inheriting it
    pub capture_stdout: bool,
    /// Tree whose `usr` becomes the sandbox's `/usr`; the host's when unset
    pub tools_tree: Option<PathBuf>,
}

impl InvocationSpec {
    /// Create a spec for the given argument vector
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Enable or disable network access
    #[must_use]
    pub fn with_network(mut self, network: bool) -> Self {
        self.network = network;
        self
    }

    /// Append mounts
    #[must_use]
    pub fn with_mounts(mut self, mounts: impl IntoIterator<Item = Mount>) -> Self {
        self.mounts.extend(mounts);
        self
    }

    /// Append a single mount
    #[must_use]
    pub fn with_mount(mut self, mount: Mount) -> Self {
        self.mounts.push(mount);
        self
    }

    /// Set environment variables
    #[must_use]
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Set working directory
    #[must_use]
    pub fn with_chdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chdir = Some(dir.into());
        self
    }

    /// Attach the virtual filesystem layer under `root`
    #[must_use]
    pub fn with_apivfs(mut self, root: impl Into<PathBuf>) -> Self {
        self.apivfs = Some(root.into());
        self
    }

    /// Take `/usr` from a tools tree instead of the host
    #[must_use]
    pub fn with_tools_tree(mut self, tree: Option<PathBuf>) -> Self {
        self.tools_tree = tree;
        self
    }

    /// Capture stdout
    #[must_use]
    pub fn capturing_stdout(mut self) -> Self {
        self.capture_stdout = true;
        self
    }

    /// Program name, if any
    #[must_use]
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Command line joined with spaces, for logging
    #[must_use]
    pub fn display_command(&self) -> String {
        self.argv.join(" ")
    }
}
