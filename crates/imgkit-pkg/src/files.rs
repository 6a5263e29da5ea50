//! Filesystem helpers for materializing configuration
//!
//! Every failure maps to [`PackageError::ConfigWrite`] naming the path.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::PackageError;

/// Create a directory and its parents
pub fn create_dir(path: &Path) -> Result<(), PackageError> {
    fs::create_dir_all(path).map_err(PackageError::write(path))
}

/// Create an empty file unless it exists; existing content is left alone
pub fn touch(path: &Path) -> Result<(), PackageError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(drop)
        .map_err(PackageError::write(path))
}

/// Write `path` only if it does not exist yet; returns whether it was written
///
/// The content is rendered only when the file is actually created.
pub fn write_if_absent<F>(path: &Path, render: F) -> Result<bool, PackageError>
where
    F: FnOnce() -> Result<String, PackageError>,
{
    if path.exists() {
        debug!(path = %path.display(), "keeping existing file");
        return Ok(false);
    }

    let content = render()?;
    write(path, &content)?;
    Ok(true)
}

/// Create or replace `path`
pub fn write(path: &Path, content: &str) -> Result<(), PackageError> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    fs::write(path, content).map_err(PackageError::write(path))?;
    debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

/// Append to `path`, creating it if missing
pub fn append(path: &Path, content: &str) -> Result<(), PackageError> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(PackageError::write(path))?;
    file.write_all(content.as_bytes())
        .map_err(PackageError::write(path))?;
    debug!(path = %path.display(), bytes = content.len(), "appended to file");
    Ok(())
}
