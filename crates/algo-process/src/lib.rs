// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! algo-process: the Process Manager — spawns, tracks, and signals
//! CPU worker subprocesses individually so a single stuck task can be
//! force-killed without disturbing the rest of the pool.

mod manager;

pub use manager::{CancelOutcome, ProcessError, ProcessManager};
