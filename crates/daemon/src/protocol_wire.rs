// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed JSON frames.
//!
//! A frame is a big-endian `u32` byte count followed by that many bytes of
//! JSON. Requests and responses share the framing; [`send`] and [`recv`] add
//! a deadline around one frame.

use std::io::ErrorKind;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest accepted frame payload (8 MiB)
pub const MAX_MESSAGE_SIZE: usize = 8 * 1024 * 1024;

/// Deadline for sending or receiving one frame
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Version exchanged in the `Hello` handshake
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

const HEADER_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("socket I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad frame payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame of {size} bytes exceeds the {MAX_MESSAGE_SIZE} byte limit")]
    MessageTooLarge { size: usize },

    #[error("peer closed the connection")]
    ConnectionClosed,

    #[error("no frame within {0:?}")]
    Timeout(Duration),
}

fn check_size(size: usize) -> Result<(), ProtocolError> {
    if size > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge { size });
    }
    Ok(())
}

/// Serialize a message into a frame payload.
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let payload = serde_json::to_vec(msg)?;
    check_size(payload.len())?;
    Ok(payload)
}

pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(payload)?)
}

/// Read one frame payload, waiting as long as it takes for the header.
///
/// EOF before the header is [`ProtocolError::ConnectionClosed`].
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut header = [0u8; HEADER_LEN];
    if let Err(e) = reader.read_exact(&mut header).await {
        return Err(match e.kind() {
            ErrorKind::UnexpectedEof => ProtocolError::ConnectionClosed,
            _ => ProtocolError::Io(e),
        });
    }
    let size = u32::from_be_bytes(header) as usize;
    check_size(size)?;

    let mut payload = vec![0u8; size];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Write header and payload with a single `write_all`, then flush.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), ProtocolError> {
    check_size(payload.len())?;
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Encode `msg` and write it as one frame within `timeout`.
pub async fn send<W, T>(writer: &mut W, msg: &T, timeout: Duration) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = encode(msg)?;
    tokio::time::timeout(timeout, write_frame(writer, &payload))
        .await
        .map_err(|_| ProtocolError::Timeout(timeout))?
}

/// Read one frame within `timeout` and decode it.
pub async fn recv<R, T>(reader: &mut R, timeout: Duration) -> Result<T, ProtocolError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let payload = tokio::time::timeout(timeout, read_frame(reader))
        .await
        .map_err(|_| ProtocolError::Timeout(timeout))??;
    decode(&payload)
}
