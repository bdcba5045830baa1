// SPDX-License-Identifier: MIT

//! Retry policy for the "database locked" transient error: up to 3
//! attempts with exponential backoff starting at 50 ms.

use std::future::Future;
use std::time::Duration;

pub const RETRY_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 50;

/// SQLite reports a busy/locked database as a database error whose code is
/// `5` (SQLITE_BUSY) or `6` (SQLITE_LOCKED); sqlx surfaces both as
/// `sqlx::Error::Database`.
pub fn is_locked(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("5") | Some("6"))
                || db_err.message().to_lowercase().contains("locked")
                || db_err.message().to_lowercase().contains("busy")
        }
        _ => false,
    }
}

/// Retry `op` up to [`RETRY_ATTEMPTS`] times on a locked-database error,
/// with exponential backoff starting at 50ms. Any other error, or
/// exhaustion of retries, bubbles up immediately.
pub async fn with_retry<F, Fut, T>(mut op: F) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut backoff_ms = INITIAL_BACKOFF_MS;
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if is_locked(&err) && attempt + 1 < RETRY_ATTEMPTS => {
                attempt += 1;
                tracing::warn!(attempt, backoff_ms, "database locked, retrying");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
