// SPDX-License-Identifier: MIT

//! Length-prefixed message framing for the Control Service's Unix socket:
//! a 4-byte big-endian length prefix followed by a JSON payload.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Framing and encoding errors.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("connection closed")]
    ConnectionClosed,
}

/// Caps a single frame, preventing a malformed length prefix from
/// triggering an unbounded allocation.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Read one length-prefixed JSON message from `reader` and deserialize it.
pub async fn read_message<T, R>(reader: &mut R) -> Result<T, WireError>
where
    T: DeserializeOwned,
    R: tokio::io::AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(WireError::ConnectionClosed);
        }
        Err(err) => return Err(WireError::Io(err)),
    }
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(WireError::MessageTooLarge { size: len, max: MAX_MESSAGE_SIZE });
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(serde_json::from_slice(&buf)?)
}

/// Serialize `msg` to JSON and write it to `writer` with its length prefix.
pub async fn write_message<T, W>(writer: &mut W, msg: &T) -> Result<(), WireError>
where
    T: Serialize,
    W: tokio::io::AsyncWriteExt + Unpin,
{
    let json = serde_json::to_vec(msg)?;
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(WireError::MessageTooLarge { size: json.len(), max: MAX_MESSAGE_SIZE });
    }
    writer.write_all(&(json.len() as u32).to_be_bytes()).await?;
    writer.write_all(&json).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "framing_tests.rs"]
mod tests;
