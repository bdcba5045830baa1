// SPDX-License-Identifier: MIT

//! In-flight progress events and status-map snapshots.

use crate::id::TaskId;
use crate::status::TaskStatus;
use serde::{Deserialize, Serialize};

/// One progress update, emitted to a task's progress channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub task_id: TaskId,
    pub percentage: u8,
    pub message: String,
    pub timestamp_ms: i64,
}

/// The Progress Manager's status-map entry for one task — the fast,
/// in-memory mirror of the corresponding `TaskRecord` row, consulted by
/// cooperative-cancel checks without touching the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusSnapshot {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub percentage: u8,
    pub message: String,
    pub updated_at_ms: i64,
}

impl TaskStatusSnapshot {
    pub fn queued(task_id: TaskId, now_ms: i64) -> Self {
        Self {
            task_id,
            status: TaskStatus::Running,
            percentage: 0,
            message: "Initializing".to_string(),
            updated_at_ms: now_ms,
        }
    }

    /// The synthetic replay event a late-attaching watcher receives so it
    /// always sees at least one message reflecting the current state.
    pub fn to_progress_event(&self) -> ProgressEvent {
        ProgressEvent {
            task_id: self.task_id.clone(),
            percentage: self.percentage,
            message: self.message.clone(),
            timestamp_ms: self.updated_at_ms,
        }
    }

    pub fn is_cancel_requested(&self) -> bool {
        matches!(self.status, TaskStatus::CancelRequested | TaskStatus::Cancelled)
    }
}
