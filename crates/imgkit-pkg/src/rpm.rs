//! Shared RPM-family setup and rpmdb fixups

use std::fs;
use std::path::Path;

use tracing::{debug, instrument};

use crate::context::Context;
use crate::error::PackageError;
use crate::files;

/// Hooks shared by all RPM-family backends
pub trait RpmHelper: Send + Sync {
    /// Prepare rpm configuration in the overlay
    ///
    /// # Errors
    /// Returns `PackageError::ConfigWrite` if the overlay cannot be written
    fn setup(&self, context: &Context) -> Result<(), PackageError>;

    /// Move the rpm database to where tools in the image expect it
    ///
    /// # Errors
    /// Returns `PackageError::ConfigWrite` if the database cannot be moved
    fn fixup_rpmdb_location(&self, context: &Context) -> Result<(), PackageError>;
}

/// Default [`RpmHelper`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RpmDb;

impl RpmHelper for RpmDb {
    fn setup(&self, context: &Context) -> Result<(), PackageError> {
        let confdir = context.pkgmngr.join("etc/rpm");
        files::create_dir(&confdir)?;

        if let Some(locale) = &context.config.locale {
            files::write_if_absent(&confdir.join("macros.lang"), || {
                Ok(format!("%_install_langs {locale}\n"))
            })?;
        }

        Ok(())
    }

    /// Some rpm builds keep the database in `~/.rpmdb`. Move it into the
    /// image's database location and leave a relative symlink behind.
    #[instrument(skip(self, context), fields(root = %context.root.display()))]
    fn fixup_rpmdb_location(&self, context: &Context) -> Result<(), PackageError> {
        let root = &context.root;
        let rpmdb_home = root.join("root/.rpmdb");
        if !rpmdb_home.is_dir() || rpmdb_home.is_symlink() {
            return Ok(());
        }

        let relative = if root.join("usr/lib/sysimage/rpm").exists() {
            Path::new("usr/lib/sysimage/rpm")
        } else {
            Path::new("var/lib/rpm")
        };
        let rpmdb = root.join(relative);

        if rpmdb.exists() {
            fs::remove_dir_all(&rpmdb).map_err(PackageError::write(&rpmdb))?;
        }
        if let Some(parent) = rpmdb.parent() {
            files::create_dir(parent)?;
        }
        fs::rename(&rpmdb_home, &rpmdb).map_err(PackageError::write(&rpmdb))?;
        std::os::unix::fs::symlink(Path::new("..").join(relative), &rpmdb_home)
            .map_err(PackageError::write(&rpmdb_home))?;

        debug!(rpmdb = %rpmdb.display(), "moved rpmdb out of /root/.rpmdb");
        Ok(())
    }
}
