//! Package manager traits

use async_trait::async_trait;

use crate::context::Context;
use crate::error::PackageError;
use crate::types::{Operation, PackageManagerType};

/// Capability contract shared by all package manager backends.
///
/// The driver picks one implementation per target distribution, calls
/// [`setup`](Self::setup) once per build context and then any number of
/// invocations. Calls against one context must not overlap.
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Repository descriptor understood by this backend
    type Repository: Send + Sync;

    /// Materialize directories and repository configuration.
    ///
    /// Idempotent: existing configuration files are left untouched.
    ///
    /// # Errors
    /// Returns `PackageError::ConfigWrite` if the overlay, root or cache cannot be written
    fn setup(&self, context: &Context, repos: &[Self::Repository]) -> Result<(), PackageError>;

    /// Argument vector for `operation`, packages sorted.
    ///
    /// Pure apart from looking up binaries in the tools tree.
    ///
    /// # Errors
    /// Returns `PackageError::MissingTool` if a binary it pins is not found
    fn build_invocation(
        &self,
        context: &Context,
        operation: &Operation,
    ) -> Result<Vec<String>, PackageError>;

    /// Run `operation` in the sandbox and wait for it
    ///
    /// # Errors
    /// Returns `PackageError::InvocationFailed` if the package manager exits non-zero
    async fn invoke(&self, context: &Context, operation: &Operation) -> Result<(), PackageError>;

    /// Index the local packages directory and register it as a trusted repository
    ///
    /// # Errors
    /// Returns an error if the indexing tool is missing or fails
    async fn create_local_repository(&self, context: &Context) -> Result<(), PackageError>;

    /// Get the package manager type
    fn manager_type(&self) -> PackageManagerType;
}
