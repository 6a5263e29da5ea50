//! Locating the binaries run inside the sandbox

use std::path::{Path, PathBuf};

use crate::error::PackageError;

/// Find `name` in the tools tree, or on `PATH` when there is none.
///
/// Tools tree hits are returned as the path the binary has inside the
/// sandbox, where the tree's `/usr` is mounted at `/usr`.
///
/// # Errors
/// Returns `PackageError::MissingTool` if the binary cannot be found
pub fn find_binary(name: &str, tools_tree: Option<&Path>) -> Result<PathBuf, PackageError> {
    let missing = || PackageError::MissingTool(name.to_string());

    let Some(tree) = tools_tree else {
        return which::which(name).map_err(|_| missing());
    };

    let search = std::env::join_paths(["usr/bin", "usr/sbin"].map(|dir| tree.join(dir)))
        .map_err(|_| missing())?;
    let found = which::which_in(name, Some(search), tree).map_err(|_| missing())?;

    let relative = match found.strip_prefix(tree) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => {
            let canonical = tree.canonicalize().map_err(|_| missing())?;
            found
                .strip_prefix(&canonical)
                .map_err(|_| missing())?
                .to_path_buf()
        }
    };

    Ok(Path::new("/").join(relative))
}
