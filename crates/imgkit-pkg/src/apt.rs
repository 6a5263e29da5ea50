//! APT package manager (Debian/Ubuntu)

use std::sync::Arc;

use async_trait::async_trait;
use imgkit_exec::{InvocationSpec, Mount, SandboxExecutor};
use tracing::{debug, info, instrument};

use crate::conf::{AptConf, DebSources, render_sources_list};
use crate::context::Context;
use crate::error::PackageError;
use crate::files;
use crate::mounts::{PACKAGES_DIR, SourceMounts, finalize_package_manager_mounts};
use crate::sandbox::{package_manager_spec, run_checked};
use crate::tools::find_binary;
use crate::traits::PackageManager;
use crate::types::{Operation, PackageManagerType};
use crate::umask::UmaskGuard;

/// Front-end used when an operation does not name one
const DEFAULT_COMMAND: &str = "apt-get";

/// `~0o755`: the dpkg database is created world-readable, owner-writable
const DPKG_UMASK: u32 = !0o755 & 0o777;

const NO_DOCS_OPTIONS: [&str; 5] = [
    "DPkg::Options::=--path-exclude=/usr/share/doc/*",
    "DPkg::Options::=--path-include=/usr/share/doc/*/copyright",
    "DPkg::Options::=--path-exclude=/usr/share/man/*",
    "DPkg::Options::=--path-exclude=/usr/share/groff/*",
    "DPkg::Options::=--path-exclude=/usr/share/info/*",
];

const INSECURE_OPTIONS: [&str; 3] = [
    "Acquire::AllowInsecureRepositories=true",
    "Acquire::AllowDowngradeToInsecureRepositories=true",
    "APT::Get::AllowUnauthenticated=true",
];

/// APT package manager implementation
pub struct AptManager {
    /// Sandbox executor for running apt commands
    executor: Arc<dyn SandboxExecutor>,
    /// Resolver for per-call source mounts
    sources: Arc<dyn SourceMounts>,
}

impl AptManager {
    /// Create a new APT manager
    ///
    /// # Arguments
    /// * `executor` - Sandbox executor for running apt and dpkg tools
    /// * `sources` - Resolver for the build source mounts of each invocation
    pub fn new(executor: Arc<dyn SandboxExecutor>, sources: Arc<dyn SourceMounts>) -> Self {
        Self { executor, sources }
    }

    /// Cache, state and configuration mounts used by every apt invocation
    #[must_use]
    pub fn persistent_mounts(context: &Context) -> Vec<Mount> {
        finalize_package_manager_mounts(context, &["apt"], &["cache/apt", "lib/apt"])
    }

    /// apt command line up to and including the front-end command
    fn apt_cmd(context: &Context, command: &str) -> Result<Vec<String>, PackageError> {
        let config = &context.config;
        let arch = &config.architecture;
        let dpkg = find_binary("dpkg", config.tools_tree.as_deref())?;

        let mut cmdline = vec![
            "env".to_string(),
            format!("APT_CONFIG={}", context.workspace.join("apt.conf").display()),
            "DEBIAN_FRONTEND=noninteractive".to_string(),
            "DEBCONF_INTERACTIVE_SEEN=true".to_string(),
            "INITRD=No".to_string(),
            command.to_string(),
        ];

        let mut options = vec![
            format!("APT::Architecture={arch}"),
            format!("APT::Architectures={arch}"),
            format!("APT::Install-Recommends={}", config.with_recommends),
            "APT::Immediate-Configure=off".to_string(),
            "APT::Get::Assume-Yes=true".to_string(),
            "APT::Get::AutomaticRemove=true".to_string(),
            "APT::Get::Allow-Change-Held-Packages=true".to_string(),
            "APT::Get::Allow-Remove-Essential=true".to_string(),
            "APT::Sandbox::User=root".to_string(),
            "Dir::Cache=/var/cache/apt".to_string(),
            "Dir::State=/var/lib/apt".to_string(),
            format!(
                "Dir::State::Status={}",
                context.root.join("var/lib/dpkg/status").display()
            ),
            format!("Dir::Log={}", context.workspace.display()),
            format!("Dir::Bin::DPkg={}", dpkg.display()),
            "Debug::NoLocking=true".to_string(),
            format!("DPkg::Options::=--root={}", context.root.display()),
            "DPkg::Options::=--force-unsafe-io".to_string(),
            "DPkg::Options::=--force-architecture".to_string(),
            "DPkg::Options::=--force-depends".to_string(),
            "DPkg::Options::=--no-debsig".to_string(),
            "DPkg::Use-Pty=false".to_string(),
            "DPkg::Install::Recursive::Minimum=1000".to_string(),
            "pkgCacheGen::ForceEssential=,".to_string(),
        ];

        if !config.repository_key_check {
            options.extend(INSECURE_OPTIONS.map(String::from));
        }

        if !config.with_docs {
            options.extend(NO_DOCS_OPTIONS.map(String::from));
        }

        for option in options {
            cmdline.push("-o".to_string());
            cmdline.push(option);
        }

        Ok(cmdline)
    }
}

#[async_trait]
impl PackageManager for AptManager {
    /// Entries of `sources.list`, one per line
    type Repository = String;

    #[instrument(skip(self, context, repos), fields(repo_count = repos.len()))]
    fn setup(&self, context: &Context, repos: &[String]) -> Result<(), PackageError> {
        let etc = context.pkgmngr.join("etc/apt");
        for dir in ["apt.conf.d", "preferences.d", "sources.list.d"] {
            files::create_dir(&etc.join(dir))?;
        }

        // TODO: drop once apt 2.5.4, which creates the status file itself, is widely available
        {
            let _umask = UmaskGuard::set(DPKG_UMASK);
            let dpkg = context.root.join("var/lib/dpkg");
            files::create_dir(&dpkg)?;
            files::touch(&dpkg.join("status"))?;
        }

        for dir in ["lib/apt", "cache/apt"] {
            files::create_dir(&context.cache_dir.join(dir))?;
        }
        files::create_dir(&context.packages)?;

        files::write_if_absent(&context.workspace.join("apt.conf"), || {
            AptConf::new("etc/apt").render()
        })?;
        files::write_if_absent(&etc.join("sources.list"), || render_sources_list(repos))?;

        debug!(pkgmngr = %context.pkgmngr.display(), "apt configured");
        Ok(())
    }

    fn build_invocation(
        &self,
        context: &Context,
        operation: &Operation,
    ) -> Result<Vec<String>, PackageError> {
        let command = operation.command.as_deref().unwrap_or(DEFAULT_COMMAND);

        let mut cmdline = Self::apt_cmd(context, command)?;
        cmdline.push(operation.verb.clone());
        cmdline.extend(operation.options.iter().cloned());
        cmdline.extend(operation.packages.iter().map(String::from));
        Ok(cmdline)
    }

    #[instrument(
        skip(self, context, operation),
        fields(verb = %operation.verb, packages = operation.packages.len())
    )]
    async fn invoke(&self, context: &Context, operation: &Operation) -> Result<(), PackageError> {
        let command = operation.command.as_deref().unwrap_or(DEFAULT_COMMAND);
        find_binary(command, context.config.tools_tree.as_deref())?;

        let argv = self.build_invocation(context, operation)?;
        let spec = package_manager_spec(
            context,
            argv,
            Self::persistent_mounts(context),
            self.sources.as_ref(),
            operation,
        )?;

        run_checked(self.executor.as_ref(), &spec).await?;

        info!(verb = %operation.verb, "apt invocation completed");
        Ok(())
    }

    #[instrument(skip(self, context), fields(packages = %context.packages.display()))]
    async fn create_local_repository(&self, context: &Context) -> Result<(), PackageError> {
        find_binary("dpkg-scanpackages", context.config.tools_tree.as_deref())?;

        let packages = &context.packages;
        let argv = ["dpkg-scanpackages".to_string(), packages.display().to_string()];
        let spec = InvocationSpec::new(argv)
            .with_mount(Mount::ro_bind(packages, packages))
            .with_tools_tree(context.config.tools_tree.clone())
            .capturing_stdout();

        let result = run_checked(self.executor.as_ref(), &spec).await?;
        files::write(&packages.join("Packages"), &result.stdout)?;

        let sources =
            DebSources::trusted_local(format!("file://{PACKAGES_DIR}"), &context.config.release);
        files::write(
            &context
                .pkgmngr
                .join("etc/apt/sources.list.d/mkosi-packages.sources"),
            &sources.render()?,
        )?;

        info!("local apt repository created");
        Ok(())
    }

    fn manager_type(&self) -> PackageManagerType {
        PackageManagerType::Apt
    }
}
