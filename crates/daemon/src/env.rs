// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access and app-directory resolution.

use std::path::PathBuf;

/// Resolve the application state directory:
/// `PYNODEX_STATE_DIR` > platform data dir (`dirs::data_local_dir()`) >
/// `~/.local/share/pynodex`.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PYNODEX_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("pynodex");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".local/share/pynodex")
}

pub fn registry_path() -> PathBuf {
    state_dir().join("processes.json")
}

pub fn logs_dir() -> PathBuf {
    state_dir().join("process_logs")
}

pub fn socket_path() -> PathBuf {
    state_dir().join("pynodex_daemon.sock")
}

pub fn pid_path() -> PathBuf {
    state_dir().join("pynodex_daemon.pid")
}

pub fn daemon_log_path() -> PathBuf {
    state_dir().join("pynodex_daemon.log")
}
