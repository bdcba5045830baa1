// SPDX-License-Identifier: MIT

//! The algorithm capability contract: a descriptor supplied at registration
//! time plus a single `execute` entry point.
//!
//! `AlgorithmDescriptor` is what a plugin hands to the registry at
//! registration time; `execute` is this trait's one method.

use crate::id::TaskId;
use serde_json::Value as Json;
use thiserror::Error;

/// Errors an algorithm's `execute` can return.
///
/// `Cancelled` is an explicit variant rather than a panic or thrown
/// exception: plugin authors propagate it with `?` exactly like any other
/// error, and the runner treats it as a distinct, non-error terminal state.
#[derive(Debug, Error)]
pub enum AlgoError {
    #[error("task was cancelled")]
    Cancelled,
    #[error("{0}")]
    Failed(String),
}

impl AlgoError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AlgoError::Cancelled)
    }
}

/// Loaded input data, handed to `execute` via the `ExecutionContext`.
///
/// A closed enum rather than an open/dynamic value, so plugins pattern
/// match on exactly the shapes a loader can hand back.
#[derive(Debug, Clone)]
pub enum DataValue {
    Bytes(Vec<u8>),
    Text(String),
    Json(Json),
}

impl DataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            DataValue::Bytes(b) => b,
            DataValue::Text(s) => s.as_bytes(),
            DataValue::Json(_) => &[],
        }
    }
}

/// Reports progress back to the dispatcher and surfaces cooperative
/// cancellation: every call checks the status map first and returns
/// `Cancelled` if a cancel was requested before recording anything.
pub trait Reporter: Send + Sync {
    fn update(&self, percentage: u8, message: &str) -> Result<(), AlgoError>;
}

/// Everything an algorithm needs to run one task. Logging is handled
/// ambiently through the `tracing` macros rather than a field on this
/// struct, matching how every other crate in this workspace logs.
pub struct ExecutionContext<'a> {
    pub task_id: TaskId,
    pub params: Json,
    pub data: DataValue,
    pub reporter: &'a dyn Reporter,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(task_id: TaskId, params: Json, data: DataValue, reporter: &'a dyn Reporter) -> Self {
        Self { task_id, params, data, reporter }
    }
}

/// The two-method capability every registered scheme implements.
///
/// `execute` returns the result payload handed to the Result Sink Client on
/// a clean finish — the typed-language stand-in for the original's
/// dynamically-returned value.
pub trait Algorithm: Send + Sync {
    fn execute(&self, ctx: &mut ExecutionContext<'_>) -> Result<Json, AlgoError>;
}

/// Constructs a boxed algorithm instance; stored alongside the descriptor
/// in the registry so the dispatcher can build a fresh instance per task.
pub type AlgorithmFactory = fn() -> Box<dyn Algorithm>;
