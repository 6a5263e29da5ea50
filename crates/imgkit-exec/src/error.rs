//! Error types for imgkit-exec

use thiserror::Error;

/// Errors that can occur while running a sandboxed command
///
/// A non-zero exit is not an error here; it is reported in the
/// [`CommandResult`](crate::CommandResult) status.
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// A required binary could not be located
    #[error("required tool not found: {0}")]
    MissingTool(String),

    /// Process spawn error
    #[error("failed to spawn process: {0}")]
    SpawnError(String),

    /// I/O error during execution
    #[error("I/O error: {0}")]
    IoError(String),
}
