// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locates the `pynodexd` binary to spawn for `daemon start`.

use std::path::PathBuf;

/// Resolution order: debug-build sibling in `target/debug/` (via
/// `CARGO_MANIFEST_DIR`, only trusted when this CLI is itself a debug
/// build — avoids picking a dev binary when a release CLI is invoked from
/// a dev checkout) > sibling of the running executable > `PATH` lookup.
pub fn find() -> PathBuf {
    let current_exe = std::env::current_exe().ok();

    let is_debug_build =
        current_exe.as_ref().and_then(|p| p.to_str()).is_some_and(|s| s.contains("target/debug"));

    if is_debug_build {
        if let Some(manifest_dir) = option_env!("CARGO_MANIFEST_DIR") {
            let dev_path =
                PathBuf::from(manifest_dir).parent().and_then(|p| p.parent()).map(|p| p.join("target/debug/pynodexd"));
            if let Some(path) = dev_path {
                if path.exists() {
                    return path;
                }
            }
        }
    }

    if let Some(exe) = &current_exe {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("pynodexd");
            if sibling.exists() {
                return sibling;
            }
        }
    }

    PathBuf::from("pynodexd")
}
