// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor Loop: the single cooperative task that alternates between
//! servicing one client connection and running one policy-monitor sweep.

use std::path::Path;
use std::time::Duration;

use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};

use pynodex_core::Clock;

use crate::listener::serve_connection;
use crate::monitor::PolicyMonitor;
use crate::probe::OsProbe;

const ACCEPT_TIMEOUT: Duration = Duration::from_secs(1);

/// Runs until a termination signal arrives, then cleans up the socket file
/// and returns. Never spawns: each connection and each monitor sweep runs
/// to completion before the loop does anything else (spec's single-threaded
/// cooperative model).
pub async fn run<C: Clock>(
    socket_path: &Path,
    registry_path: &Path,
    logs_dir: &Path,
    clock: C,
) -> std::io::Result<()> {
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let listener = UnixListener::bind(socket_path)?;
    let mut probe = OsProbe::new();
    let monitor = PolicyMonitor::new(registry_path.to_path_buf(), logs_dir.to_path_buf(), clock.clone());

    let mut sigterm = signal(SignalKind::terminate())?;

    tracing::info!(socket = %socket_path.display(), "supervisor loop starting");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received SIGINT, shutting down");
                break;
            }
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM, shutting down");
                break;
            }
            accepted = tokio::time::timeout(ACCEPT_TIMEOUT, listener.accept()) => {
                match accepted {
                    Ok(Ok((stream, _addr))) => {
                        serve_connection(stream, registry_path, logs_dir, &mut probe, clock.clone()).await;
                    }
                    Ok(Err(err)) => {
                        tracing::warn!(error = %err, "failed to accept connection");
                    }
                    Err(_elapsed) => {
                        if let Err(err) = monitor.sweep(&mut probe) {
                            tracing::warn!(error = %err, "policy monitor sweep failed");
                        }
                    }
                }
            }
        }
    }

    let _ = std::fs::remove_file(socket_path);
    Ok(())
}
