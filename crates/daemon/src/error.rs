// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-level error type, unifying the lower crates' errors into the
//! seven-kind classification the listener uses to build responses.

use thiserror::Error;

use pynodex_core::{CoreError, ErrorKind};
use pynodex_storage::StorageError;

use crate::launcher::LauncherError;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Launcher(#[from] LauncherError),

    #[error("operation not permitted by the OS: {0}")]
    OsDenied(String),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::Core(err) => err.kind(),
            LifecycleError::Storage(_) => ErrorKind::Storage,
            LifecycleError::Launcher(err) => match err {
                LauncherError::PortOutOfRange(_) | LauncherError::CwdMissing(_) => {
                    ErrorKind::UserInput
                }
                LauncherError::PortInUse(_) => ErrorKind::Collision,
                LauncherError::LogFile { .. } | LauncherError::Spawn(_) => ErrorKind::OsMissing,
            },
            LifecycleError::OsDenied(_) => ErrorKind::OsDenied,
        }
    }
}
