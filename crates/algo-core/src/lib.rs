// SPDX-License-Identifier: MIT

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! algo-core: shared domain types for the algorithm execution service.

pub mod macros;

pub mod algorithm;
pub mod clock;
pub mod config;
pub mod dataref;
pub mod descriptor;
pub mod id;
pub mod metrics;
pub mod progress;
pub mod status;
pub mod task;

pub use algorithm::{Algorithm, AlgoError, AlgorithmFactory, DataValue, ExecutionContext, Reporter};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{AppConfig, ConfigSnapshot};
pub use dataref::{DataLoader, DataLoaderError, FileLoader, UrlDataLoader};
pub use descriptor::AlgorithmDescriptor;
pub use id::{SchemeCode, TaskId};
pub use metrics::{DispatcherMetrics, FailureCounters};
pub use progress::{ProgressEvent, TaskStatusSnapshot};
pub use status::{transition, ResourceType, TaskStatus, TransitionError};
pub use task::TaskRecord;
