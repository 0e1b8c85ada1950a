// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RegistryStore`: load/save of the process registry to `processes.json`.
//!
//! Writes go to a sibling `.tmp` file followed by a rename, which is atomic
//! on the local filesystems this daemon targets — the same write-then-rename
//! ethos as the teacher's snapshot writer. A shared lock file guards the
//! rename against a concurrent reader (only ever another `pynodex` CLI
//! invocation reading the file directly, never another daemon — the daemon
//! itself is single-instance, guarded by its PID file).

use std::fs::{self, Permissions};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use fs2::FileExt;
use pynodex_core::Registry;

use crate::error::StorageError;

/// Persists a [`Registry`] to a single JSON file.
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Load the registry from disk.
    ///
    /// A missing file is treated as an empty, freshly-initialized registry.
    /// A file that exists but fails to parse is *also* treated as empty —
    /// logged via `tracing::warn!` rather than surfaced as an error — so a
    /// corrupted `processes.json` never prevents the daemon from starting.
    pub fn load(&self) -> Result<Registry, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Registry::new()),
            Err(err) => {
                return Err(StorageError::Read { path: self.path.display().to_string(), source: err })
            }
        };

        match serde_json::from_str(&raw) {
            Ok(registry) => Ok(registry),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "processes.json is corrupt, starting from an empty registry"
                );
                Ok(Registry::new())
            }
        }
    }

    /// Save the registry to disk, atomically.
    pub fn save(&self, registry: &Registry) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| StorageError::CreateDir { path: parent.display().to_string(), source })?;
        }

        let lock_file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(self.lock_path())
            .map_err(|source| StorageError::Lock { path: self.lock_path().display().to_string(), source })?;
        lock_file
            .lock_exclusive()
            .map_err(|source| StorageError::Lock { path: self.lock_path().display().to_string(), source })?;

        let json = serde_json::to_string_pretty(registry)
            .unwrap_or_else(|_| "{}".to_string());

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, json)
            .map_err(|source| StorageError::Write { path: tmp_path.display().to_string(), source })?;

        fs::rename(&tmp_path, &self.path)
            .map_err(|source| StorageError::Write { path: self.path.display().to_string(), source })?;

        set_owner_only_permissions(&self.path)?;

        // lock_file drops here, releasing the advisory lock.
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> Result<(), StorageError> {
    fs::set_permissions(path, Permissions::from_mode(0o600))
        .map_err(|source| StorageError::Write { path: path.display().to_string(), source })
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> Result<(), StorageError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pynodex_core::record::{ProcessRecord, Status};
    use std::collections::HashMap;

    fn sample_registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .insert(ProcessRecord {
                name: "web".to_string(),
                command: "python -m http.server 8123".to_string(),
                cwd: None,
                env: HashMap::new(),
                port: Some(8123),
                pid: Some(123),
                status: Status::running(),
                start_time: 1_700_000_000_000,
                stdout_log: "/tmp/web_stdout.log".to_string(),
                stderr_log: "/tmp/web_stderr.log".to_string(),
                max_cpu_restart: None,
                max_memory_restart: None,
                restart_delay_ms: None,
                no_autorestart: false,
                watch: false,
                cron: None,
                time_prefix_logs: false,
            })
            .unwrap();
        registry
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("processes.json"));
        let registry = store.load().unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("processes.json"));
        let registry = sample_registry();
        store.save(&registry).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("web").unwrap().pid, Some(123));
    }

    #[test]
    fn corrupt_file_loads_as_empty_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processes.json");
        fs::write(&path, "{ not valid json").unwrap();

        let store = RegistryStore::new(path);
        let registry = store.load().unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn save_leaves_no_tmp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new(dir.path().join("processes.json"));
        store.save(&sample_registry()).unwrap();
        assert!(!store.tmp_path().exists());
        assert!(store.path().exists());
    }
}
