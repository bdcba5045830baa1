// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! algo-plugins: the built-in algorithm implementations.
//!
//! Each module exposes a `register(registry: &Registry)` free function;
//! [`register_all`] calls every one of them and is the single discovery
//! pass run from both the daemon's startup and the worker subprocess's
//! entry point.

mod scm_wf01;
mod scm_wf02;
mod scm_wf03;
mod stm_wf01;

#[cfg(test)]
mod test_support;

use algo_registry::Registry;

/// Register every built-in algorithm. Idempotent: calling it twice on the
/// same registry just re-registers each code (last-write-wins, logged).
pub fn register_all(registry: &Registry) {
    scm_wf01::register(registry);
    scm_wf02::register(registry);
    scm_wf03::register(registry);
    stm_wf01::register(registry);
}
