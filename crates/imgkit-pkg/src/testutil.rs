//! Shared helpers for unit tests

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::config::BuildConfig;
use crate::context::Context;

/// Create executable stub files below `root`
pub fn fake_tools(root: &Path, paths: &[&str]) {
    for path in paths {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// Context rooted in `dir` with a tools tree providing the usual binaries
pub fn test_context(dir: &Path, config: BuildConfig) -> Context {
    let tools = dir.join("tools");
    fake_tools(
        &tools,
        &[
            "usr/bin/apt-get",
            "usr/bin/dpkg",
            "usr/bin/dpkg-scanpackages",
            "usr/bin/zypper",
            "usr/bin/createrepo_c",
        ],
    );

    let config = BuildConfig {
        tools_tree: Some(tools),
        ..config
    };
    Context::new(config, dir.join("root"), dir.join("workspace"), dir.join("cache"))
}
