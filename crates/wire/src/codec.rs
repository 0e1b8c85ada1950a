// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newline-delimited JSON framing over an async byte stream.
//!
//! Each message is one JSON document followed by `\n`. There is no length
//! prefix and no versioning field; unknown keys are ignored by `serde`'s
//! default behavior, which is the protocol's only forward-compatibility
//! guarantee.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed before a complete message was received")]
    ConnectionClosed,

    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize a message to a single newline-terminated JSON line.
pub fn encode<T: Serialize>(message: &T) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

/// Parse one line (without its trailing newline) as a JSON message.
pub fn decode<T: DeserializeOwned>(line: &str) -> Result<T, ProtocolError> {
    Ok(serde_json::from_str(line.trim_end())?)
}

/// Read one newline-delimited message from `reader`.
///
/// Returns `Err(ProtocolError::ConnectionClosed)` if the peer closed the
/// connection without sending a complete line.
pub async fn read_message<T, R>(reader: &mut BufReader<R>) -> Result<T, ProtocolError>
where
    T: DeserializeOwned,
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    let bytes_read = reader.read_line(&mut line).await?;
    if bytes_read == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }
    decode(&line)
}

/// Write one message to `writer`, newline-terminated, and flush.
pub async fn write_message<T, W>(writer: &mut W, message: &T) -> Result<(), ProtocolError>
where
    T: Serialize,
    W: tokio::io::AsyncWrite + Unpin,
{
    let line = encode(message)?;
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
