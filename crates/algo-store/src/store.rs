// SPDX-License-Identifier: MIT

//! The `TaskStore`: durable record of every task's last known state,
//! backed by SQLite in WAL journal mode with `synchronous=NORMAL`.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use algo_core::{transition, TaskRecord, TaskStatus, TransitionError};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use thiserror::Error;

use crate::retry::with_retry;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to create data directory: {0}")]
    DirectoryCreation(#[source] std::io::Error),
}

/// Totals by status, backing a `list_schemes`/`health`-style dashboard
/// line in the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TaskCounts {
    pub queued: u64,
    pub running: u64,
    pub cancel_requested: u64,
    pub cancelled: u64,
    pub success: u64,
    pub failed: u64,
}

/// Durable key-value record of every task's last known state.
#[derive(Clone)]
pub struct TaskStore {
    pool: SqlitePool,
}

impl TaskStore {
    /// Open (creating if missing) the SQLite database at `path`.
    pub async fn connect(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(StoreError::DirectoryCreation)?;
            }
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new().max_connections(5).connect_with(options).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// In-memory store, for tests.
    pub async fn connect_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .shared_cache(true);
        let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create the `tasks` table if missing; add `error_message` if absent.
    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS tasks (
                task_id TEXT PRIMARY KEY,
                scheme_code TEXT NOT NULL,
                status TEXT NOT NULL,
                percentage INTEGER NOT NULL,
                message TEXT NOT NULL,
                data_ref TEXT NOT NULL,
                created_at_ms INTEGER NOT NULL,
                updated_at_ms INTEGER NOT NULL
            )"#,
        )
        .execute(&self.pool)
        .await?;

        let columns: Vec<String> = sqlx::query("PRAGMA table_info(tasks)")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| row.get::<String, _>("name"))
            .collect();

        if !columns.iter().any(|c| c == "error_message") {
            tracing::info!("migrating tasks table: adding error_message column");
            sqlx::query("ALTER TABLE tasks ADD COLUMN error_message TEXT NOT NULL DEFAULT ''")
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    /// Insert-or-update with `status=RUNNING, percentage=0,
    /// message="Initializing"`.
    pub async fn upsert_start(
        &self,
        task_id: &str,
        scheme_code: &str,
        data_ref: &str,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        with_retry(|| async {
            sqlx::query(
                r#"INSERT INTO tasks
                    (task_id, scheme_code, status, percentage, message, error_message, data_ref, created_at_ms, updated_at_ms)
                   VALUES (?, ?, ?, 0, 'Initializing', '', ?, ?, ?)
                   ON CONFLICT(task_id) DO UPDATE SET
                     scheme_code = excluded.scheme_code,
                     status = excluded.status,
                     percentage = 0,
                     message = 'Initializing',
                     error_message = '',
                     data_ref = excluded.data_ref,
                     updated_at_ms = excluded.updated_at_ms"#,
            )
            .bind(task_id)
            .bind(scheme_code)
            .bind(TaskStatus::Running.to_string())
            .bind(data_ref)
            .bind(now_ms)
            .bind(now_ms)
            .execute(&self.pool)
            .await
        })
        .await?;
        Ok(())
    }

    /// Update columns for an in-flight task; if no row exists, first call
    /// `upsert_start` then retry.
    pub async fn update_progress(
        &self,
        task_id: &str,
        scheme_code: &str,
        data_ref: &str,
        percentage: u8,
        message: &str,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        if self.get(task_id).await?.is_none() {
            self.upsert_start(task_id, scheme_code, data_ref, now_ms).await?;
        }

        let Some(current) = self.get(task_id).await? else {
            return Ok(());
        };
        if let Err(TransitionError::AlreadyTerminal { .. }) =
            transition(current.status, current.percentage, TaskStatus::Running, percentage)
        {
            tracing::warn!(task_id, "ignoring progress update for a terminal task");
            return Ok(());
        }
        let percentage = percentage.max(current.percentage);

        with_retry(|| async {
            sqlx::query(
                "UPDATE tasks SET status = ?, percentage = ?, message = ?, updated_at_ms = ? WHERE task_id = ?",
            )
            .bind(TaskStatus::Running.to_string())
            .bind(percentage as i64)
            .bind(message)
            .bind(now_ms)
            .bind(task_id)
            .execute(&self.pool)
            .await
        })
        .await?;
        Ok(())
    }

    /// Set `percentage=100` and the given terminal fields; create-then-finish
    /// if the row is missing. Idempotent: once a task is terminal,
    /// further `finish` calls are silent no-ops.
    pub async fn finish(
        &self,
        task_id: &str,
        scheme_code: &str,
        data_ref: &str,
        status: TaskStatus,
        message: &str,
        error_message: &str,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        if self.get(task_id).await?.is_none() {
            self.upsert_start(task_id, scheme_code, data_ref, now_ms).await?;
        }

        let Some(current) = self.get(task_id).await? else {
            return Ok(());
        };
        if current.status.is_terminal() {
            return Ok(());
        }

        with_retry(|| async {
            sqlx::query(
                "UPDATE tasks SET status = ?, percentage = 100, message = ?, error_message = ?, updated_at_ms = ? WHERE task_id = ?",
            )
            .bind(status.to_string())
            .bind(message)
            .bind(error_message)
            .bind(now_ms)
            .bind(task_id)
            .execute(&self.pool)
            .await
        })
        .await?;
        Ok(())
    }

    /// Record that cancellation was requested, without touching
    /// `percentage`. A no-op on a missing or already terminal task.
    pub async fn mark_cancel_requested(&self, task_id: &str, now_ms: i64) -> Result<(), StoreError> {
        let Some(current) = self.get(task_id).await? else {
            return Ok(());
        };
        if current.status.is_terminal() {
            return Ok(());
        }
        with_retry(|| async {
            sqlx::query("UPDATE tasks SET status = ?, message = ?, updated_at_ms = ? WHERE task_id = ?")
                .bind(TaskStatus::CancelRequested.to_string())
                .bind("Cancel requested")
                .bind(now_ms)
                .bind(task_id)
                .execute(&self.pool)
                .await
        })
        .await?;
        Ok(())
    }

    pub async fn get(&self, task_id: &str) -> Result<Option<TaskRecord>, StoreError> {
        let row = with_retry(|| async {
            sqlx::query("SELECT * FROM tasks WHERE task_id = ?").bind(task_id).fetch_optional(&self.pool).await
        })
        .await?;
        Ok(row.map(row_to_record))
    }

    /// `list() -> [record]` ordered by `updated_at DESC`.
    pub async fn list(&self) -> Result<Vec<TaskRecord>, StoreError> {
        let rows = with_retry(|| async {
            sqlx::query("SELECT * FROM tasks ORDER BY updated_at_ms DESC").fetch_all(&self.pool).await
        })
        .await?;
        Ok(rows.into_iter().map(row_to_record).collect())
    }

    /// Totals by status.
    pub async fn counts(&self) -> Result<TaskCounts, StoreError> {
        let records = self.list().await?;
        let mut counts = TaskCounts::default();
        for record in records {
            match record.status {
                TaskStatus::Queued => counts.queued += 1,
                TaskStatus::Running => counts.running += 1,
                TaskStatus::CancelRequested => counts.cancel_requested += 1,
                TaskStatus::Cancelled => counts.cancelled += 1,
                TaskStatus::Success => counts.success += 1,
                TaskStatus::Failed => counts.failed += 1,
            }
        }
        Ok(counts)
    }
}

fn row_to_record(row: SqliteRow) -> TaskRecord {
    let status_str: String = row.get("status");
    let status = match status_str.as_str() {
        "QUEUED" => TaskStatus::Queued,
        "RUNNING" => TaskStatus::Running,
        "CANCEL_REQUESTED" => TaskStatus::CancelRequested,
        "CANCELLED" => TaskStatus::Cancelled,
        "SUCCESS" => TaskStatus::Success,
        _ => TaskStatus::Failed,
    };
    TaskRecord {
        task_id: algo_core::TaskId::new(row.get::<String, _>("task_id")),
        scheme_code: row.get("scheme_code"),
        status,
        percentage: row.get::<i64, _>("percentage") as u8,
        message: row.get("message"),
        error_message: row.get("error_message"),
        data_ref: row.get("data_ref"),
        created_at_ms: row.get("created_at_ms"),
        updated_at_ms: row.get("updated_at_ms"),
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
