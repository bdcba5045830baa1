// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! algo-registry: the Algorithm Registry, Plugin Discovery entry point, and
//! the Hardware Manager.
//!
//! Registry and Discovery are grouped with the Hardware Manager because
//! both are read-mostly state constructed once at startup and never
//! touched by the per-task write paths that dominate the rest of the
//! workspace.

pub mod hardware;
pub mod registry;

pub use hardware::{ExecutorKind, GpuInfo, GpuJobHandle, GpuPool, HardwareManager};
pub use registry::{Registry, RegistryError};
