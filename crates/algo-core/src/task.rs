// SPDX-License-Identifier: MIT

//! The task record persisted by the Task Store.

use crate::id::TaskId;
use crate::status::TaskStatus;
use serde::{Deserialize, Serialize};

/// A task's last known state, as durably recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: TaskId,
    pub scheme_code: String,
    pub status: TaskStatus,
    pub percentage: u8,
    pub message: String,
    pub error_message: String,
    pub data_ref: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

impl TaskRecord {
    pub fn new_queued(task_id: TaskId, scheme_code: String, data_ref: String, now_ms: i64) -> Self {
        Self {
            task_id,
            scheme_code,
            status: TaskStatus::Running,
            percentage: 0,
            message: "Initializing".to_string(),
            error_message: String::new(),
            data_ref,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl TaskRecord {
    /// Test convenience constructor for a record in an arbitrary state.
    pub fn test_record(task_id: &str, status: TaskStatus, percentage: u8) -> Self {
        Self {
            task_id: TaskId::new(task_id),
            scheme_code: "SCM-TEST".to_string(),
            status,
            percentage,
            message: String::new(),
            error_message: String::new(),
            data_ref: "test://fixture".to_string(),
            created_at_ms: 0,
            updated_at_ms: 0,
        }
    }
}
