// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! algo-dispatcher: the Task Dispatcher — the single entry point a
//! Control Service talks to. Picks an executor per submission, wires
//! progress/cancel plumbing through to the Progress Manager and Process
//! Manager, and exposes the read paths (list/get/watch/health) the wire
//! protocol serializes.

mod dispatcher;
mod gpu_runner;

pub use dispatcher::{CancelOutcomeKind, DispatchError, Dispatcher};
