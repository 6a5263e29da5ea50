//! imgkit-pkg: Package manager integration for image builds
//!
//! Configures, invokes and synthesizes local repositories for the native
//! package manager of the target distribution (apt, zypper). Commands run
//! through an [`imgkit_exec::SandboxExecutor`].

pub mod apt;
pub mod conf;
pub mod config;
pub mod context;
pub mod error;
pub mod files;
pub mod mounts;
pub mod rpm;
pub mod sandbox;
pub mod tools;
pub mod traits;
pub mod types;
pub mod umask;
pub mod zypper;

#[cfg(test)]
mod testutil;

pub use apt::AptManager;
pub use config::{BuildConfig, BuildSource, Distribution};
pub use context::Context;
pub use error::PackageError;
pub use mounts::{BuildSources, SourceMounts};
pub use rpm::{RpmDb, RpmHelper};
pub use traits::PackageManager;
pub use types::{Operation, PackageManagerType, PackageSet, RpmRepository};
pub use umask::UmaskGuard;
pub use zypper::ZypperManager;
