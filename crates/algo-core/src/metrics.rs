// SPDX-License-Identifier: MIT

//! Plain snapshot types for operator-facing counters: the DB-writer's
//! retry/drop counters and the dispatcher's submission counters. Modeled
//! as plain serializable snapshot structs rather than exposing atomics
//! over the wire directly.

use serde::{Deserialize, Serialize};

/// Snapshot of the Progress Manager's DB-writer retry/drop counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCounters {
    pub succeeded: u64,
    pub failed: u64,
    pub dropped: u64,
}

/// Snapshot of the Task Dispatcher's lifetime submission counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherMetrics {
    pub submitted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub cancelled: u64,
}
