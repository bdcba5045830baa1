// SPDX-License-Identifier: MIT

//! The Control Service's response surface.

use crate::types::{GpuAvailability, SchemeInfo};
use algo_core::{ConfigSnapshot, DispatcherMetrics, ProgressEvent, TaskRecord};
use serde::{Deserialize, Serialize};

/// Outcome of a `CancelTask` call. Distinguishes the cooperative
/// request path from the cases where cancellation cannot apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelStatus {
    /// The task was terminated immediately (force, or it was still queued).
    Cancelled,
    /// A running CPU task is being escalated from SIGTERM to SIGKILL.
    Terminating,
    /// Cooperative cancellation was recorded; the runner will observe it.
    CancelRequested,
    /// The task was already in a terminal state; no-op.
    AlreadyTerminal,
    NotFound,
}

/// Overall daemon health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Serving,
}

/// Every reply the Control Service can send, framed length-prefixed over
/// the Unix socket. `Progress`/`Done` are the two frames of a
/// `WatchTaskProgress` stream; every other variant is a single reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// reply to `GetAvailableSchemes`.
    Schemes { schemes: Vec<SchemeInfo> },
    /// reply to `SubmitTask`.
    Submitted { task_id: String },
    /// reply to `CancelTask`.
    Cancelled { status: CancelStatus },
    /// reply to `CheckHealth`.
    Health {
        status: HealthStatus,
        gpu: GpuAvailability,
        config: ConfigSnapshot,
        metrics: DispatcherMetrics,
    },
    /// one frame of a `WatchTaskProgress` stream.
    Progress(ProgressEvent),
    /// terminator for a `WatchTaskProgress` stream, sent once
    /// `percentage >= 100` or the task reaches a terminal status.
    Done,
    /// reply to `ListTasks`.
    Tasks { tasks: Vec<TaskRecord> },
    /// reply to `GetTaskStatus`.
    Task { task: Option<TaskRecord> },
    /// A request failed validation or addressed an unknown task/scheme.
    Error { message: String },
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
