// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! algo-progress: the Progress Manager.
//!
//! Owns three structures: a process-shared status map, a per-task
//! progress channel, and a durable-write queue drained by a single
//! background writer. CPU subprocesses have no shared memory with the
//! parent, so all of their updates are routed through this same API from
//! a per-child stdout reader task that lives in `algo-process` — from
//! here, a CPU subprocess and an in-process GPU task look identical.

mod manager;
mod watcher;
mod writer;

pub use manager::{ProgressError, ProgressManager};
pub use watcher::Watcher;
pub use writer::WriteOp;
