//! Sandboxed command execution using bubblewrap and `tokio::process`

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, instrument};

use crate::error::ExecError;
use crate::invocation::InvocationSpec;
use crate::result::CommandResult;
use crate::traits::SandboxExecutor;

/// Bubblewrap sandbox executor
///
/// Runs every command in fresh namespaces with a read-only `/usr` taken from
/// the host or from the spec's tools tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct BwrapExecutor;

impl BwrapExecutor {
    /// Create a new executor
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compose the bubblewrap arguments for a spec
    #[must_use]
    pub fn command_line(&self, spec: &InvocationSpec) -> Vec<String> {
        let usr = spec
            .tools_tree
            .as_deref()
            .map_or_else(|| PathBuf::from("/usr"), |tree| tree.join("usr"))
            .display()
            .to_string();

        let mut args: Vec<String> = vec!["--die-with-parent".into(), "--unshare-all".into()];
        if spec.network {
            args.push("--share-net".into());
        }

        #[rustfmt::skip]
        let base = [
            "--dev", "/dev",
            "--proc", "/proc",
            "--tmpfs", "/tmp",
            "--ro-bind", usr.as_str(), "/usr",
            "--symlink", "usr/bin", "/bin",
            "--symlink", "usr/sbin", "/sbin",
            "--symlink", "usr/lib", "/lib",
            "--symlink", "usr/lib64", "/lib64",
        ];
        args.extend(base.map(String::from));

        if spec.network {
            args.extend(
                ["--ro-bind-try", "/etc/resolv.conf", "/etc/resolv.conf"].map(String::from),
            );
        }

        for mount in &spec.mounts {
            args.extend(mount.to_args());
        }

        if let Some(root) = &spec.apivfs {
            args.extend(apivfs_args(root));
        }

        if let Some(dir) = &spec.chdir {
            args.push("--chdir".into());
            args.push(dir.display().to_string());
        }

        args.push("--".into());
        args.extend(spec.argv.iter().cloned());
        args
    }

    /// Internal method to execute command
    #[instrument(skip(self, spec), fields(command = %spec.display_command()), level = "debug")]
    async fn execute(&self, spec: &InvocationSpec) -> Result<CommandResult, ExecError> {
        let bwrap = which::which("bwrap").map_err(|_| ExecError::MissingTool("bwrap".into()))?;
        let start = Instant::now();

        debug!(network = spec.network, mounts = spec.mounts.len(), "executing sandboxed command");

        let stdout = if spec.capture_stdout {
            Stdio::piped()
        } else {
            Stdio::inherit()
        };

        let child = Command::new(bwrap)
            .args(self.command_line(spec))
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecError::SpawnError(e.to_string()))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExecError::IoError(e.to_string()))?;

        let duration = start.elapsed();

        let status = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        debug!(status = status, duration = ?duration, "command completed");

        if !output.status.success() {
            error!(
                command = %spec.display_command(),
                status = status,
                stderr = %stderr,
                "command failed"
            );
        }

        Ok(CommandResult {
            status,
            stdout,
            stderr,
            duration,
        })
    }
}

/// Stand-ins for /proc, /dev, /sys and /run under `root`
fn apivfs_args(root: &Path) -> Vec<String> {
    let under = |dir: &str| root.join(dir).display().to_string();
    vec![
        "--proc".into(),
        under("proc"),
        "--dev".into(),
        under("dev"),
        "--ro-bind".into(),
        "/sys".into(),
        under("sys"),
        "--tmpfs".into(),
        under("run"),
    ]
}

#[async_trait]
impl SandboxExecutor for BwrapExecutor {
    async fn run(&self, spec: &InvocationSpec) -> Result<CommandResult, ExecError> {
        self.execute(spec).await
    }

    fn executor_type(&self) -> &'static str {
        "bwrap"
    }
}
