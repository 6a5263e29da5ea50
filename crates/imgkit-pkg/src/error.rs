//! Error types for imgkit-pkg

use std::path::PathBuf;

use imgkit_exec::ExecError;
use thiserror::Error;

/// Errors that can occur during package manager operations
#[derive(Error, Debug)]
pub enum PackageError {
    /// Writing configuration or creating a directory failed
    #[error("failed to write {}: {source}", path.display())]
    ConfigWrite {
        /// Path being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Package manager process exited non-zero
    #[error("command failed: {command} exited with status {status}")]
    InvocationFailed {
        /// Command line that failed
        command: String,
        /// Exit status
        status: i32,
    },

    /// Required binary not found
    #[error("required tool not found: {0}")]
    MissingTool(String),

    /// Sandbox executor failed before the command could report a status
    #[error("execution error: {0}")]
    Exec(ExecError),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

impl PackageError {
    /// Build a [`PackageError::ConfigWrite`] mapper for `path`
    pub(crate) fn write(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| PackageError::ConfigWrite { path, source }
    }
}

impl From<ExecError> for PackageError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::MissingTool(tool) => PackageError::MissingTool(tool),
            other => PackageError::Exec(other),
        }
    }
}
