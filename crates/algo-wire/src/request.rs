// SPDX-License-Identifier: MIT

//! The Control Service's request surface.

use serde::{Deserialize, Serialize};

/// One call into the Control Service over the length-prefixed socket
/// protocol. `algoctl` and any other client speak this enum directly
/// instead of a generated stub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// `GetAvailableSchemes`.
    GetAvailableSchemes,
    /// `SubmitTask`.
    SubmitTask {
        task_id: String,
        scheme_code: String,
        data_ref: String,
        /// Opaque algorithm parameters, passed through as raw JSON.
        params: serde_json::Value,
    },
    /// `CancelTask`.
    CancelTask { task_id: String, force: bool },
    /// `CheckHealth`.
    CheckHealth,
    /// `WatchTaskProgress` — the server streams `Response::Progress`
    /// frames followed by a terminal `Response::Done`.
    WatchTaskProgress { task_id: String },
    /// `ListTasks`.
    ListTasks,
    /// `GetTaskStatus`.
    GetTaskStatus { task_id: String },
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
