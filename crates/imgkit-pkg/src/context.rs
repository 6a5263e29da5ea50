//! Build context shared by all backend operations

use std::path::PathBuf;

use crate::config::BuildConfig;

/// Paths and configuration of one image build.
///
/// Owned by the build driver. Backends read it and write below `root`,
/// `pkgmngr`, `cache_dir`, `workspace` and `packages`. Operations against the
/// same context must be serialized by the caller.
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved build configuration
    pub config: BuildConfig,
    /// Target root filesystem
    pub root: PathBuf,
    /// Overlay carrying package manager configuration (`etc/apt`, `etc/zypp`)
    pub pkgmngr: PathBuf,
    /// Persistent package cache
    pub cache_dir: PathBuf,
    /// Scratch workspace
    pub workspace: PathBuf,
    /// Locally built packages
    pub packages: PathBuf,
}

impl Context {
    /// Create a context; the overlay and packages directories live in the workspace
    pub fn new(
        config: BuildConfig,
        root: impl Into<PathBuf>,
        workspace: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        let workspace = workspace.into();
        Self {
            config,
            root: root.into(),
            pkgmngr: workspace.join("pkgmngr"),
            cache_dir: cache_dir.into(),
            packages: workspace.join("packages"),
            workspace,
        }
    }
}
