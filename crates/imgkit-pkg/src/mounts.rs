//! Mount composition for package manager invocations
//!
//! Mount lists are recomputed for every call: ephemeral source mounts can be
//! created and torn down between invocations.

use std::path::Path;

use imgkit_exec::Mount;

use crate::context::Context;
use crate::error::PackageError;

/// Working directory of package manager invocations inside the sandbox
pub const SOURCE_DIR: &str = "/work/src";

/// Mount point of the local packages directory inside the sandbox
pub const PACKAGES_DIR: &str = "/work/packages";

/// Resolves the build source mounts for a single invocation
pub trait SourceMounts: Send + Sync {
    /// Mounts valid for the duration of one call
    ///
    /// # Errors
    /// Returns an error if a source cannot be exposed
    fn ephemeral_source_mounts(&self, context: &Context) -> Result<Vec<Mount>, PackageError>;
}

/// Binds each configured build source read-write below [`SOURCE_DIR`]
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildSources;

impl SourceMounts for BuildSources {
    fn ephemeral_source_mounts(&self, context: &Context) -> Result<Vec<Mount>, PackageError> {
        context
            .config
            .build_sources
            .iter()
            .map(|src| {
                if !src.source.is_dir() {
                    return Err(PackageError::ConfigError(format!(
                        "build source {} is not a directory",
                        src.source.display()
                    )));
                }
                let target = src.target.strip_prefix("/").unwrap_or(&src.target);
                Ok(Mount::bind(&src.source, Path::new(SOURCE_DIR).join(target)))
            })
            .collect()
    }
}

/// Persistent mounts of one package manager.
///
/// Binds the workspace at its own path, each existing `etc/<dir>` of the
/// overlay read-only at `/etc/<dir>`, each existing cache subdirectory
/// (`cache/apt`, `lib/apt`, ...) at `/var/<subdir>` and the local packages
/// directory at [`PACKAGES_DIR`].
#[must_use]
pub fn finalize_package_manager_mounts(
    context: &Context,
    etc_dirs: &[&str],
    cache_dirs: &[&str],
) -> Vec<Mount> {
    let mut mounts = vec![Mount::identity(&context.workspace)];

    for dir in etc_dirs {
        let source = context.pkgmngr.join("etc").join(dir);
        if source.exists() {
            mounts.push(Mount::ro_bind(source, Path::new("/etc").join(dir)));
        }
    }

    for dir in cache_dirs {
        let source = context.cache_dir.join(dir);
        if source.exists() {
            mounts.push(Mount::bind(source, Path::new("/var").join(dir)));
        }
    }

    if context.packages.exists() {
        mounts.push(Mount::ro_bind(&context.packages, PACKAGES_DIR));
    }

    mounts
}
