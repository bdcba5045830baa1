// SPDX-License-Identifier: MIT

//! Task status and the centralized transition-policing chokepoint.
//!
//! Rather than relying on every writer to cooperatively follow the
//! lifecycle rules, this module centralizes the transition table so every
//! writer — status map, store, dispatcher — goes through the same check.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Queued,
    Running,
    CancelRequested,
    Cancelled,
    Success,
    Failed,
}

crate::simple_display! {
    TaskStatus {
        Queued => "QUEUED",
        Running => "RUNNING",
        CancelRequested => "CANCEL_REQUESTED",
        Cancelled => "CANCELLED",
        Success => "SUCCESS",
        Failed => "FAILED",
    }
}

impl TaskStatus {
    /// Terminal statuses: once reached, no further transitions are allowed.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failed | TaskStatus::Cancelled)
    }
}

/// The hardware class an algorithm requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceType {
    Cpu,
    Gpu,
}

crate::simple_display! {
    ResourceType {
        Cpu => "CPU",
        Gpu => "GPU",
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("task is already in terminal state {current}, cannot transition to {attempted}")]
    AlreadyTerminal { current: TaskStatus, attempted: TaskStatus },
    #[error("percentage must be non-decreasing: {current} -> {attempted}")]
    PercentageDecreased { current: u8, attempted: u8 },
}

/// Validate a proposed status transition, rejecting anything that would
/// violate the task lifecycle invariants: a terminal state is final, and
/// `percentage` never decreases within a task.
pub fn transition(
    current: TaskStatus,
    current_pct: u8,
    attempted: TaskStatus,
    attempted_pct: u8,
) -> Result<(), TransitionError> {
    if current.is_terminal() && attempted != current {
        return Err(TransitionError::AlreadyTerminal { current, attempted });
    }
    if attempted_pct < current_pct {
        return Err(TransitionError::PercentageDecreased { current: current_pct, attempted: attempted_pct });
    }
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
