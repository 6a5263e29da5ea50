//! Composition of sandboxed package manager invocations

use imgkit_exec::{CommandResult, InvocationSpec, Mount, SandboxExecutor};
use tracing::{debug, error};

use crate::context::Context;
use crate::error::PackageError;
use crate::mounts::{SOURCE_DIR, SourceMounts};
use crate::types::Operation;

/// Build the network-enabled spec used by `invoke` on every backend.
///
/// The sandbox's `/usr` comes from the same tools tree that binaries are
/// resolved in. Mount order: target root, the backend's persistent mounts, ephemeral
/// source mounts, then the operation's extra mounts.
///
/// # Errors
/// Returns an error if the source mounts cannot be resolved
pub fn package_manager_spec(
    context: &Context,
    argv: Vec<String>,
    persistent: Vec<Mount>,
    sources: &dyn SourceMounts,
    operation: &Operation,
) -> Result<InvocationSpec, PackageError> {
    let ephemeral = sources.ephemeral_source_mounts(context)?;

    let mut spec = InvocationSpec::new(argv)
        .with_network(true)
        .with_mount(Mount::identity(&context.root))
        .with_mounts(persistent)
        .with_mounts(ephemeral)
        .with_mounts(operation.mounts.iter().cloned())
        .with_env(context.config.environment.clone())
        .with_chdir(SOURCE_DIR)
        .with_tools_tree(context.config.tools_tree.clone());

    if operation.apivfs {
        spec = spec.with_apivfs(&context.root);
    }

    Ok(spec)
}

/// Run a spec and turn a non-zero exit into [`PackageError::InvocationFailed`]
///
/// # Errors
/// Returns an error if the executor fails or the command exits non-zero
pub async fn run_checked(
    executor: &dyn SandboxExecutor,
    spec: &InvocationSpec,
) -> Result<CommandResult, PackageError> {
    debug!(
        executor = executor.executor_type(),
        command = %spec.display_command(),
        "running package manager"
    );

    let result = executor.run(spec).await?;

    if !result.success() {
        error!(
            command = %spec.display_command(),
            status = result.status,
            "package manager invocation failed"
        );
        return Err(PackageError::InvocationFailed {
            command: spec.display_command(),
            status: result.status,
        });
    }

    Ok(result)
}
