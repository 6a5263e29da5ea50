//! Sandbox executor trait

use async_trait::async_trait;

use crate::error::ExecError;
use crate::invocation::InvocationSpec;
use crate::result::CommandResult;

/// Runs an [`InvocationSpec`] inside an isolated filesystem/network namespace.
///
/// Implementations wait for the process to exit and report its status in the
/// returned [`CommandResult`]; a non-zero status is not an `Err` at this level.
#[async_trait]
pub trait SandboxExecutor: Send + Sync {
    /// Run the invocation and wait for it to finish
    async fn run(&self, spec: &InvocationSpec) -> Result<CommandResult, ExecError>;

    /// Short name of the executor, used in logs
    fn executor_type(&self) -> &'static str;
}
