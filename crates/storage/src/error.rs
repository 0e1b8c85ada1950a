// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage-layer errors.

use thiserror::Error;

use pynodex_core::ErrorKind;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: String, #[source] source: std::io::Error },

    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: String, #[source] source: std::io::Error },

    #[error("failed to acquire lock on {path}: {source}")]
    Lock { path: String, #[source] source: std::io::Error },
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Storage
    }
}
