// SPDX-License-Identifier: MIT

//! Newline-delimited JSON framing for the subprocess boundary between
//! `algo-process` and `algo-worker`. A child's stdout/stdin are
//! already line-oriented byte streams with one reader and one writer each,
//! so this needs none of the length-prefix machinery in `framing`.

use algo_core::TaskStatus;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

use crate::framing::WireError;

/// One line a worker writes to its stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChildMessage {
    Progress { percentage: u8, message: String },
    Finished {
        status: TaskStatus,
        message: String,
        error_message: String,
        /// The algorithm's returned value on a clean `SUCCESS`; `Null` for
        /// every other terminal status. Carried here rather than fetched
        /// back from the dead worker, since a force-killed child can no
        /// longer be asked for anything.
        #[serde(default)]
        data: serde_json::Value,
    },
}

/// One line the parent writes to a child's stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParentMessage {
    CancelRequested,
}

/// Read and parse one `ChildMessage` line. Returns `Ok(None)` on a clean
/// EOF (the child exited without writing a trailing `Finished` line, e.g.
/// a crash); the Process Manager treats that as a failure outcome.
pub async fn read_child_message<R>(reader: &mut R) -> Result<Option<ChildMessage>, WireError>
where
    R: AsyncBufReadExt + Unpin,
{
    read_line(reader).await
}

/// Read and parse one `ParentMessage` line, as consumed by the child's
/// cooperative-cancel background task.
pub async fn read_parent_message<R>(reader: &mut R) -> Result<Option<ParentMessage>, WireError>
where
    R: AsyncBufReadExt + Unpin,
{
    read_line(reader).await
}

/// Serialize `message` as one JSON line, newline-terminated, and flush.
pub async fn write_child_message<W>(writer: &mut W, message: &ChildMessage) -> Result<(), WireError>
where
    W: AsyncWriteExt + Unpin,
{
    write_line(writer, message).await
}

/// Serialize `message` as one JSON line, newline-terminated, and flush.
pub async fn write_parent_message<W>(writer: &mut W, message: &ParentMessage) -> Result<(), WireError>
where
    W: AsyncWriteExt + Unpin,
{
    write_line(writer, message).await
}

async fn read_line<T, R>(reader: &mut R) -> Result<Option<T>, WireError>
where
    T: for<'de> Deserialize<'de>,
    R: AsyncBufReadExt + Unpin,
{
    let mut line = String::new();
    let read = reader.read_line(&mut line).await?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line.trim_end())?))
}

async fn write_line<T, W>(writer: &mut W, value: &T) -> Result<(), WireError>
where
    T: Serialize,
    W: AsyncWriteExt + Unpin,
{
    let mut json = serde_json::to_vec(value)?;
    json.push(b'\n');
    writer.write_all(&json).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "child_tests.rs"]
mod tests;
