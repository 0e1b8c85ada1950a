// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin client over the daemon's Unix socket: connect, send one request,
//! read back the symmetric response. One request per connection, matching
//! the daemon listener's contract.

use std::io::BufRead;
use std::time::Duration;

use thiserror::Error;
use tokio::io::BufReader;
use tokio::net::UnixStream;

use pynodex_daemon::env;
use pynodex_wire::{read_message, write_message, Request, Response};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running")]
    NotRunning,

    #[error("failed to start daemon: {0}")]
    StartFailed(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] pynodex_wire::ProtocolError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn is_not_running(&self) -> bool {
        matches!(self, ClientError::NotRunning)
    }
}

pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    /// Connect to an already-running daemon. Does not start one.
    pub async fn connect() -> Result<Self, ClientError> {
        let stream = UnixStream::connect(env::socket_path())
            .await
            .map_err(|_| ClientError::NotRunning)?;
        Ok(Self { stream })
    }

    /// Connect, starting the daemon in the background first if its socket
    /// is absent.
    pub async fn connect_or_start() -> Result<Self, ClientError> {
        if let Ok(client) = Self::connect().await {
            return Ok(client);
        }
        spawn_daemon()?;
        wait_for_socket().await?;
        Self::connect().await
    }

    /// Send one request and read back the one response.
    pub async fn send(self, request: &Request) -> Result<Response, ClientError> {
        let (read_half, mut write_half) = self.stream.into_split();
        write_message(&mut write_half, request).await?;

        let mut reader = BufReader::new(read_half);
        let response = read_message(&mut reader).await?;
        Ok(response)
    }
}

fn spawn_daemon() -> Result<(), ClientError> {
    let exe = crate::daemon_binary::find();
    std::process::Command::new(exe)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|err| ClientError::StartFailed(err.to_string()))?;
    Ok(())
}

async fn wait_for_socket() -> Result<(), ClientError> {
    let deadline = std::time::Instant::now() + Duration::from_secs(3);
    while std::time::Instant::now() < deadline {
        if env::socket_path().exists() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let reason = parse_startup_error(&std::fs::read_to_string(env::daemon_log_path()).unwrap_or_default())
        .unwrap_or_else(|| "daemon did not create its socket in time".to_string());
    Err(ClientError::StartFailed(reason))
}

/// Pull the message after the last `ERROR Failed to start daemon:` line in
/// the daemon's log, used to surface a startup failure to the CLI user.
fn parse_startup_error(log: &str) -> Option<String> {
    const PREFIX: &str = "ERROR Failed to start daemon: ";
    log.lines()
        .filter_map(|line| line.trim().strip_prefix(PREFIX))
        .last()
        .map(|msg| msg.to_string())
}

/// Read the last `n` lines of a file without loading the whole file when
/// it's small; used by the `logs` command.
pub fn read_last_lines(path: &std::path::Path, n: usize) -> std::io::Result<String> {
    let file = std::fs::File::open(path)?;
    let lines: Vec<String> = std::io::BufReader::new(file).lines().collect::<std::io::Result<_>>()?;
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_startup_error_finds_last_message() {
        let log = "\
--- pynodexd: starting (pid: 100) ---
ERROR Failed to start daemon: first failure
--- pynodexd: starting (pid: 200) ---
ERROR Failed to start daemon: second failure
";
        assert_eq!(parse_startup_error(log).as_deref(), Some("second failure"));
    }

    #[test]
    fn parse_startup_error_none_when_absent() {
        assert_eq!(parse_startup_error("nothing to see here\n"), None);
    }
}
