//! imgkit-exec: Sandboxed command execution
//!
//! Provides the invocation model (argument vector, mounts, network toggle,
//! environment) and the executors that run it inside an isolated namespace.

pub mod bwrap;
pub mod error;
pub mod invocation;
pub mod result;
pub mod traits;

pub use bwrap::BwrapExecutor;
pub use error::ExecError;
pub use invocation::{InvocationSpec, Mount};
pub use result::CommandResult;
pub use traits::SandboxExecutor;
