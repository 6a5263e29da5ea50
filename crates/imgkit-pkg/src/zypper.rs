//! Zypper package manager (openSUSE)

use std::sync::Arc;

use async_trait::async_trait;
use imgkit_exec::{InvocationSpec, Mount, SandboxExecutor};
use tracing::{debug, info, instrument};

use crate::conf::{RepoStanza, ZyppTuning};
use crate::context::Context;
use crate::error::PackageError;
use crate::files;
use crate::mounts::{PACKAGES_DIR, SourceMounts, finalize_package_manager_mounts};
use crate::rpm::RpmHelper;
use crate::sandbox::{package_manager_spec, run_checked};
use crate::tools::find_binary;
use crate::traits::PackageManager;
use crate::types::{Operation, PackageManagerType, RpmRepository};

/// Identifier of the repository holding locally built packages
const LOCAL_REPO_ID: &str = "mkosi-packages";

/// Zypper package manager implementation
///
/// Shared rpm concerns (macros, rpmdb location) go through an [`RpmHelper`].
pub struct ZypperManager {
    executor: Arc<dyn SandboxExecutor>,
    sources: Arc<dyn SourceMounts>,
    rpm: Arc<dyn RpmHelper>,
}

impl ZypperManager {
    /// Create a new zypper manager
    pub fn new(
        executor: Arc<dyn SandboxExecutor>,
        sources: Arc<dyn SourceMounts>,
        rpm: Arc<dyn RpmHelper>,
    ) -> Self {
        Self {
            executor,
            sources,
            rpm,
        }
    }

    /// Cache and configuration mounts used by every zypper invocation
    #[must_use]
    pub fn persistent_mounts(context: &Context) -> Vec<Mount> {
        finalize_package_manager_mounts(context, &["zypp", "rpm"], &["cache/zypp"])
    }

    /// Render `mkosi.repo`
    fn render_repos(repos: &[RpmRepository]) -> Result<String, PackageError> {
        let mut out = String::new();
        for repo in repos {
            let stanza = RepoStanza::new(&repo.id)
                .entry("name", &repo.id)
                .raw_line(&repo.url)
                .entry("gpgcheck", 1)
                .entry("enabled", u8::from(repo.enabled))
                .entry("autorefresh", 1)
                .entry("keeppackages", 1)
                .with_gpgkeys(repo.gpgurls.iter().cloned());
            out.push_str(&stanza.render()?);
        }
        Ok(out)
    }

    /// zypper command line up to the verb
    fn zypper_cmd(context: &Context) -> Vec<String> {
        let trust = if context.config.repository_key_check {
            "--gpg-auto-import-keys"
        } else {
            "--no-gpg-checks"
        };

        vec![
            "env".to_string(),
            "ZYPP_CONF=/etc/zypp/zypp.conf".to_string(),
            "HOME=/".to_string(),
            "zypper".to_string(),
            format!("--installroot={}", context.root.display()),
            "--cache-dir=/var/cache/zypp".to_string(),
            trust.to_string(),
            "--non-interactive".to_string(),
        ]
    }
}

#[async_trait]
impl PackageManager for ZypperManager {
    type Repository = RpmRepository;

    /// The tuning block is appended on every call, duplicating it when setup
    /// runs more than once against the same overlay.
    #[instrument(skip(self, context, repos), fields(repo_count = repos.len()))]
    fn setup(&self, context: &Context, repos: &[RpmRepository]) -> Result<(), PackageError> {
        let zypp = context.pkgmngr.join("etc/zypp");
        files::create_dir(&zypp)?;
        files::create_dir(&context.cache_dir.join("cache/zypp"))?;
        files::create_dir(&context.packages)?;

        let tuning = ZyppTuning::new(!context.config.with_docs);
        files::append(&zypp.join("zypp.conf"), &tuning.render())?;

        files::write_if_absent(&zypp.join("repos.d/mkosi.repo"), || {
            Self::render_repos(repos)
        })?;

        self.rpm.setup(context)?;

        debug!(pkgmngr = %context.pkgmngr.display(), "zypper configured");
        Ok(())
    }

    fn build_invocation(
        &self,
        context: &Context,
        operation: &Operation,
    ) -> Result<Vec<String>, PackageError> {
        let mut cmdline = Self::zypper_cmd(context);
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
        find_binary("zypper", context.config.tools_tree.as_deref())?;

        let argv = self.build_invocation(context, operation)?;
        let spec = package_manager_spec(
            context,
            argv,
            Self::persistent_mounts(context),
            self.sources.as_ref(),
            operation,
        )?;

        run_checked(self.executor.as_ref(), &spec).await?;
        self.rpm.fixup_rpmdb_location(context)?;

        info!(verb = %operation.verb, "zypper invocation completed");
        Ok(())
    }

    #[instrument(skip(self, context), fields(packages = %context.packages.display()))]
    async fn create_local_repository(&self, context: &Context) -> Result<(), PackageError> {
        find_binary("createrepo_c", context.config.tools_tree.as_deref())?;

        let packages = &context.packages;
        let argv = ["createrepo_c".to_string(), packages.display().to_string()];
        let spec = InvocationSpec::new(argv)
            .with_mount(Mount::identity(packages))
            .with_tools_tree(context.config.tools_tree.clone());
        run_checked(self.executor.as_ref(), &spec).await?;

        let stanza = RepoStanza::new(LOCAL_REPO_ID)
            .entry("name", LOCAL_REPO_ID)
            .entry("gpgcheck", 0)
            .entry("enabled", 1)
            .entry("baseurl", format!("file://{PACKAGES_DIR}"))
            .entry("autorefresh", 0)
            .entry("priority", 50);
        files::write(
            &context
                .pkgmngr
                .join(format!("etc/zypp/repos.d/{LOCAL_REPO_ID}.repo")),
            &stanza.render()?,
        )?;

        info!("local zypper repository created");
        Ok(())
    }

    fn manager_type(&self) -> PackageManagerType {
        PackageManagerType::Zypper
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::BuildConfig;
    use crate::mounts::BuildSources;
    use crate::rpm::RpmDb;
    use crate::testutil::test_context;
    use imgkit_exec::BwrapExecutor;
    use tempfile::TempDir;

    fn manager() -> ZypperManager {
        ZypperManager::new(
            Arc::new(BwrapExecutor::new()),
            Arc::new(BuildSources),
            Arc::new(RpmDb),
        )
    }

    #[test]
    fn test_build_invocation() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path(), BuildConfig::default());
        let op = Operation::new("install")
            .with_options(["--download-in-advance"])
            .with_packages(["patterns-base-minimal_base", "kernel-default", "bash"]);

        let argv = manager().build_invocation(&ctx, &op).unwrap();

        assert_eq!(
            argv,
            [
                "env".to_string(),
                "ZYPP_CONF=/etc/zypp/zypp.conf".to_string(),
                "HOME=/".to_string(),
                "zypper".to_string(),
                format!("--installroot={}", ctx.root.display()),
                "--cache-dir=/var/cache/zypp".to_string(),
                "--gpg-auto-import-keys".to_string(),
                "--non-interactive".to_string(),
                "install".to_string(),
                "--download-in-advance".to_string(),
                "bash".to_string(),
                "kernel-default".to_string(),
                "patterns-base-minimal_base".to_string(),
            ]
        );
    }

    #[test]
    fn test_trust_flags_are_exclusive() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(
            dir.path(),
            BuildConfig {
                repository_key_check: false,
                ..BuildConfig::default()
            },
        );

        let argv = manager()
            .build_invocation(&ctx, &Operation::new("refresh"))
            .unwrap();

        assert!(argv.iter().any(|a| a == "--no-gpg-checks"));
        assert!(!argv.iter().any(|a| a == "--gpg-auto-import-keys"));
    }

    #[test]
    fn test_repo_file_multiple_gpgkeys() {
        let repos = [
            RpmRepository::new("oss", "baseurl=http://download/oss")
                .with_gpgurl("http://download/key-a")
                .with_gpgurl("http://download/key-b")
                .with_gpgurl("http://download/key-c"),
            RpmRepository::new("debug", "mirrorlist=http://mirrors/debug").with_enabled(false),
        ];

        let rendered = ZypperManager::render_repos(&repos).unwrap();

        assert_eq!(
            rendered,
            "[oss]\n\
             name=oss\n\
             baseurl=http://download/oss\n\
             gpgcheck=1\n\
             enabled=1\n\
             autorefresh=1\n\
             keeppackages=1\n\
             gpgkey=http://download/key-a\n\
             \x20      http://download/key-b\n\
             \x20      http://download/key-c\n\
             [debug]\n\
             name=debug\n\
             mirrorlist=http://mirrors/debug\n\
             gpgcheck=1\n\
             enabled=0\n\
             autorefresh=1\n\
             keeppackages=1\n"
        );
    }

    #[test]
    fn test_repo_file_keeps_url_line_as_given() {
        let repos = [
            RpmRepository::new("base", "baseurl = http://example/repo"),
            RpmRepository::new("meta", "metalink=http://mirrors/metalink?repo=oss&arch=x86_64"),
        ];

        let rendered = ZypperManager::render_repos(&repos).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[2], "baseurl = http://example/repo");
        assert!(lines.contains(&"metalink=http://mirrors/metalink?repo=oss&arch=x86_64"));
        assert!(!rendered.contains("baseurl=baseurl"));
    }

    #[test]
    fn test_setup_appends_tuning_and_keeps_repo_file() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path(), BuildConfig::default());
        let conf = ctx.pkgmngr.join("etc/zypp/zypp.conf");
        fs::create_dir_all(conf.parent().unwrap()).unwrap();
        fs::write(&conf, "[main]\nsolver.onlyRequires = true\n").unwrap();

        let repos = [RpmRepository::new("base", "baseurl=http://example/repo")];
        manager().setup(&ctx, &repos).unwrap();

        let repo_file = ctx.pkgmngr.join("etc/zypp/repos.d/mkosi.repo");
        let first = fs::read(&repo_file).unwrap();

        manager()
            .setup(&ctx, &[RpmRepository::new("other", "baseurl=http://other/")])
            .unwrap();

        assert_eq!(fs::read(&repo_file).unwrap(), first);

        let content = fs::read_to_string(&conf).unwrap();
        assert!(content.starts_with("[main]\nsolver.onlyRequires = true\n"));
        assert_eq!(content.matches("rpm.install.excludedocs = yes").count(), 2);
        assert_eq!(content.matches("repo.refresh.delay = 2880").count(), 2);
        assert!(ctx.cache_dir.join("cache/zypp").is_dir());
        assert!(ctx.pkgmngr.join("etc/rpm").is_dir());
    }

    #[test]
    fn test_persistent_mounts_include_rpm_config() {
        let dir = TempDir::new().unwrap();
        let ctx = test_context(dir.path(), BuildConfig::default());
        manager().setup(&ctx, &[]).unwrap();

        let mounts = ZypperManager::persistent_mounts(&ctx);

        assert!(mounts.contains(&Mount::ro_bind(ctx.pkgmngr.join("etc/zypp"), "/etc/zypp")));
        assert!(mounts.contains(&Mount::ro_bind(ctx.pkgmngr.join("etc/rpm"), "/etc/rpm")));
        assert!(mounts.contains(&Mount::bind(ctx.cache_dir.join("cache/zypp"), "/var/cache/zypp")));
        assert!(mounts.contains(&Mount::ro_bind(&ctx.packages, "/work/packages")));
        assert_eq!(manager().manager_type(), PackageManagerType::Zypper);
    }
}
