// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-instance guard for the daemon process, backed by an exclusive
//! advisory lock on the PID file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PidFileError {
    #[error("another pynodexd instance is already running")]
    AlreadyRunning,

    #[error("failed to access pid file {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },
}

/// Holds the daemon's PID file lock for the process lifetime. The file is
/// removed when this guard drops.
pub struct PidFile {
    path: PathBuf,
    file: File,
}

impl PidFile {
    /// Acquire the PID file, failing if another instance already holds it.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self, PidFileError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| PidFileError::Io { path: path.display().to_string(), source })?;
        }

        let file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| PidFileError::Io { path: path.display().to_string(), source })?;

        file.try_lock_exclusive().map_err(|_| PidFileError::AlreadyRunning)?;

        file.set_len(0)
            .map_err(|source| PidFileError::Io { path: path.display().to_string(), source })?;
        let mut writable = &file;
        writable
            .write_all(std::process::id().to_string().as_bytes())
            .map_err(|source| PidFileError::Io { path: path.display().to_string(), source })?;

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_writes_own_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pynodexd.pid");
        let guard = PidFile::acquire(&path).unwrap();
        let contents = fs::read_to_string(guard.path()).unwrap();
        assert_eq!(contents, std::process::id().to_string());
    }

    #[test]
    fn second_acquire_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pynodexd.pid");
        let _first = PidFile::acquire(&path).unwrap();
        let second = PidFile::acquire(&path);
        assert!(matches!(second, Err(PidFileError::AlreadyRunning)));
    }

    #[test]
    fn drop_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pynodexd.pid");
        {
            let _guard = PidFile::acquire(&path).unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }
}
