// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! algo-wire: the Control Service's IPC protocol.
//!
//! Wire format: a 4-byte big-endian length prefix + JSON payload. The
//! `Request`/`Response` enums carry the RPC-flavored method names clients
//! expect (`SubmitTask`, `CancelTask`, `WatchTaskProgress`, ...).
//!
//! A second, simpler framing is used for the subprocess boundary between
//! `algo-process` and `algo-worker`: newline-delimited JSON, since a
//! child's stdout/stdin are already byte streams with natural line
//! boundaries and no concurrent multiplexing is needed there.

mod child;
mod framing;
mod request;
mod response;
mod types;

pub use child::{read_child_message, read_parent_message, write_child_message, write_parent_message, ChildMessage, ParentMessage};
pub use framing::{read_message, write_message, WireError};
pub use request::Request;
pub use response::{CancelStatus, HealthStatus, Response};
pub use types::{GpuAvailability, SchemeInfo};
