// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! algo-store: the durable Task Store.
//!
//! An embedded SQLite store rather than a hand-rolled event-log WAL: WAL
//! journal mode, relaxed fsync, and a locked-database retry policy on top.

mod retry;
mod store;

pub use retry::RETRY_ATTEMPTS;
pub use store::{StoreError, TaskCounts, TaskStore};
