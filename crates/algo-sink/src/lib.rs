// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! algo-sink: the Result Sink Client — delivers a task's terminal result to
//! its local artifact and, optionally, a remote HTTP collector.

mod client;
mod value;

pub use client::{ResultSinkClient, SinkError};
pub use value::SinkValue;
