// SPDX-License-Identifier: MIT

//! Shared test doubles for the per-algorithm test modules.

use algo_core::{AlgoError, DataValue, ExecutionContext, Reporter, TaskId};

pub struct NullReporter;
impl Reporter for NullReporter {
    fn update(&self, _percentage: u8, _message: &str) -> Result<(), AlgoError> {
        Ok(())
    }
}

pub struct CancellingReporter;
impl Reporter for CancellingReporter {
    fn update(&self, _percentage: u8, _message: &str) -> Result<(), AlgoError> {
        Err(AlgoError::Cancelled)
    }
}

pub fn ctx(reporter: &dyn Reporter) -> ExecutionContext<'_> {
    ExecutionContext::new(TaskId::new("t1"), serde_json::json!({}), DataValue::Text(String::new()), reporter)
}
