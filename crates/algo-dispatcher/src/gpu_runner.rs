// SPDX-License-Identifier: MIT

//! The in-process GPU execution path: runs one algorithm on a
//! [`algo_registry::GpuPool`] worker thread, reporting progress straight
//! into the Progress Manager (no subprocess boundary to cross) and
//! delivering the result through the sink before the thread returns.

use std::sync::Arc;

use algo_core::{
    AlgoError, Clock, DataLoader, ExecutionContext, Reporter, TaskId, TaskStatus, UrlDataLoader,
};
use algo_progress::ProgressManager;
use algo_registry::Registry;
use algo_sink::{ResultSinkClient, SinkValue};

/// Bridges the Progress Manager's cooperative-cancel check into the
/// synchronous `Reporter` contract every algorithm calls through.
struct GpuReporter<C: Clock> {
    progress: Arc<ProgressManager>,
    task_id: String,
    scheme_code: String,
    data_ref: String,
    clock: C,
}

impl<C: Clock> Reporter for GpuReporter<C> {
    fn update(&self, percentage: u8, message: &str) -> Result<(), AlgoError> {
        let now_ms = self.clock.epoch_ms();
        self.progress
            .record_progress(&self.task_id, &self.scheme_code, &self.data_ref, percentage, message, now_ms)
            .map_err(|_| AlgoError::Cancelled)
    }
}

/// Runs entirely on a `GpuPool` worker thread. Bridges back into async
/// code for the sink's HTTP delivery via the captured runtime handle —
/// the thread itself is plain `FnOnce() + Send`, not a tokio task.
#[allow(clippy::too_many_arguments)]
pub fn run<C: Clock>(
    registry: Arc<Registry>,
    progress: Arc<ProgressManager>,
    sink: Arc<ResultSinkClient>,
    runtime: tokio::runtime::Handle,
    clock: C,
    task_id: String,
    scheme_code: String,
    data_ref: String,
    params: serde_json::Value,
) {
    let reporter =
        GpuReporter { progress: progress.clone(), task_id: task_id.clone(), scheme_code: scheme_code.clone(), data_ref: data_ref.clone(), clock: clock.clone() };

    let (status, data, message, error_message) = match registry.build(&scheme_code) {
        Ok(algorithm) => match UrlDataLoader::default().load(&data_ref) {
            Ok((loaded, _meta)) => {
                let mut ctx = ExecutionContext::new(TaskId::new(task_id.clone()), params, loaded, &reporter);
                match algorithm.execute(&mut ctx) {
                    Ok(result) => (TaskStatus::Success, SinkValue::Json(result), "Completed".to_string(), String::new()),
                    Err(AlgoError::Cancelled) => {
                        (TaskStatus::Cancelled, SinkValue::Text(String::new()), "Cancelled".to_string(), String::new())
                    }
                    Err(AlgoError::Failed(err)) => {
                        (TaskStatus::Failed, SinkValue::Text(String::new()), "Failed".to_string(), err)
                    }
                }
            }
            Err(err) => {
                let message = err.to_string();
                (TaskStatus::Failed, SinkValue::Text(String::new()), "Failed".to_string(), message)
            }
        },
        Err(err) => {
            let message = err.to_string();
            (TaskStatus::Failed, SinkValue::Text(String::new()), "Failed".to_string(), message)
        }
    };

    let now_ms = clock.epoch_ms();
    progress.mark_finished(&task_id, &scheme_code, &data_ref, status, &message, &error_message, now_ms);

    let task_id = TaskId::new(task_id);
    let error = Option::from(error_message).filter(|s: &String| !s.is_empty());
    runtime.block_on(async {
        if let Err(err) = sink.send_result(&task_id, status, data, error.as_deref()).await {
            tracing::warn!(task_id = %task_id, error = %err, "failed to write local result artifact");
        }
    });
}

#[cfg(test)]
#[path = "gpu_runner_tests.rs"]
mod tests;
