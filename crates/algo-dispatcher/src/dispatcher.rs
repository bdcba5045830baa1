// SPDX-License-Identifier: MIT

//! The Task Dispatcher: the single entry point a Control Service talks to.
//! Accepts submissions, picks an executor, wires progress/cancel plumbing,
//! and exposes the read paths (list/get/watch/health) the protocol layer
//! serializes onto the wire.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use algo_core::{AlgorithmDescriptor, Clock, DispatcherMetrics, TaskId, TaskRecord, TaskStatus};
use algo_process::{CancelOutcome, ProcessManager};
use algo_progress::{ProgressManager, Watcher};
use algo_registry::{GpuJobHandle, HardwareManager, Registry};
use algo_sink::ResultSinkClient;
use algo_store::{StoreError, TaskCounts, TaskStore};
use dashmap::DashMap;
use thiserror::Error;

use crate::gpu_runner;

/// Outcome of [`Dispatcher::cancel`], mirroring the wire protocol's
/// `CancelStatus` one level down from the protocol crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcomeKind {
    Cancelled,
    Terminating,
    CancelRequested,
    AlreadyTerminal,
    NotFound,
}

/// The union error type the Control Service converts into a wire-level
/// `Response::Error` message. `submit`/`cancel` never surface an error —
/// acceptance and cancellation outcomes are always synchronous values —
/// so this only covers the read paths, which bottom out in the store.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> DispatcherMetrics {
        DispatcherMetrics {
            submitted: self.submitted.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}

pub struct Dispatcher<C: Clock> {
    registry: Arc<Registry>,
    store: TaskStore,
    progress: Arc<ProgressManager>,
    process: Arc<ProcessManager<C>>,
    hardware: Arc<HardwareManager>,
    sink: Arc<ResultSinkClient>,
    clock: C,
    worker_binary: PathBuf,
    gpu_jobs: DashMap<String, GpuJobHandle>,
    /// `task_id -> (scheme_code, data_ref)`, recorded at submit time so
    /// `cancel` can finish a task without needing a lookup back to the
    /// store.
    task_meta: DashMap<String, (String, String)>,
    counters: Counters,
}

impl<C: Clock> Dispatcher<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<Registry>,
        store: TaskStore,
        progress: Arc<ProgressManager>,
        process: Arc<ProcessManager<C>>,
        hardware: Arc<HardwareManager>,
        sink: Arc<ResultSinkClient>,
        clock: C,
        worker_binary: PathBuf,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            store,
            progress,
            process,
            hardware,
            sink,
            clock,
            worker_binary,
            gpu_jobs: DashMap::new(),
            task_meta: DashMap::new(),
            counters: Counters::default(),
        })
    }

    /// Accept a submission: validate the scheme, seed progress/store state,
    /// pick an executor, and dispatch. Returns once the task is handed off
    /// to its executor — not once it finishes.
    ///
    /// An unknown scheme or a refused executor submission is not bubbled
    /// up as an error: the Control Service always acknowledges acceptance
    /// synchronously, and the failure is recorded as a terminal `FAILED`
    /// task instead, exactly like any other in-flight failure.
    pub async fn submit(
        self: &Arc<Self>,
        task_id: &str,
        scheme_code: &str,
        data_ref: &str,
        params: serde_json::Value,
    ) {
        let now_ms = self.clock.epoch_ms();
        self.progress.register_task(task_id, scheme_code, data_ref, now_ms);
        self.task_meta.insert(task_id.to_string(), (scheme_code.to_string(), data_ref.to_string()));
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);
        self.spawn_metrics_watcher(task_id.to_string());

        let Some(descriptor) = self.registry.get(scheme_code) else {
            let message = format!("no algorithm registered under scheme code {scheme_code:?}");
            self.fail_synchronously(task_id, scheme_code, data_ref, &message, now_ms);
            return;
        };

        match self.hardware.executor_for(descriptor.resource_type) {
            algo_registry::ExecutorKind::Cpu => {
                let args = worker_args(task_id, scheme_code, data_ref, &params);
                if let Err(err) = self
                    .process
                    .submit(task_id, scheme_code, data_ref, &self.worker_binary.to_string_lossy(), &args)
                    .await
                {
                    self.fail_synchronously(task_id, scheme_code, data_ref, &err.to_string(), now_ms);
                }
            }
            algo_registry::ExecutorKind::Gpu => {
                self.submit_gpu(task_id, scheme_code, data_ref, params, descriptor, now_ms);
            }
        }
    }

    /// Mirror a submit-time failure into the status map, the store (via
    /// the durable-write queue), and the result sink, all before `submit`
    /// returns — "fast-fail FAILED written to store + sink, returned
    /// synchronously" per the unknown-scheme and executor-refused cases.
    fn fail_synchronously(self: &Arc<Self>, task_id: &str, scheme_code: &str, data_ref: &str, message: &str, now_ms: i64) {
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        self.progress.mark_finished(task_id, scheme_code, data_ref, TaskStatus::Failed, "Failed", message, now_ms);

        let sink = self.sink.clone();
        let task_id = TaskId::new(task_id);
        let message = message.to_string();
        tokio::spawn(async move {
            let _ = sink.send_result(&task_id, TaskStatus::Failed, algo_sink::SinkValue::Text(String::new()), Some(&message)).await;
        });
    }

    fn submit_gpu(
        self: &Arc<Self>,
        task_id: &str,
        scheme_code: &str,
        data_ref: &str,
        params: serde_json::Value,
        _descriptor: Arc<AlgorithmDescriptor>,
        now_ms: i64,
    ) {
        let Some(pool) = self.hardware.gpu_pool() else {
            self.fail_synchronously(task_id, scheme_code, data_ref, "GPU executor unavailable", now_ms);
            return;
        };

        let registry = self.registry.clone();
        let progress = self.progress.clone();
        let sink = self.sink.clone();
        let clock = self.clock.clone();
        let runtime = tokio::runtime::Handle::current();
        let task_id_owned = task_id.to_string();
        let scheme_code_owned = scheme_code.to_string();
        let data_ref_owned = data_ref.to_string();

        let handle = pool.submit(move || {
            gpu_runner::run(
                registry,
                progress,
                sink,
                runtime,
                clock,
                task_id_owned,
                scheme_code_owned,
                data_ref_owned,
                params,
            );
        });
        self.gpu_jobs.insert(task_id.to_string(), handle);
    }

    /// Spawn the per-task watcher that tallies terminal outcomes into the
    /// lifetime metrics, regardless of which executor ran the task.
    fn spawn_metrics_watcher(self: &Arc<Self>, task_id: String) {
        let this = self.clone();
        tokio::spawn(async move {
            let mut watcher = this.progress.register_watcher(&task_id);
            while watcher.next().await.is_some() {
                if let Some(snapshot) = this.progress.snapshot(&task_id) {
                    if snapshot.status.is_terminal() {
                        match snapshot.status {
                            TaskStatus::Success => this.counters.succeeded.fetch_add(1, Ordering::Relaxed),
                            TaskStatus::Failed => this.counters.failed.fetch_add(1, Ordering::Relaxed),
                            TaskStatus::Cancelled => this.counters.cancelled.fetch_add(1, Ordering::Relaxed),
                            _ => 0,
                        };
                        break;
                    }
                }
            }
            this.progress.close_watcher(&task_id);
            this.task_meta.remove(&task_id);
        });
    }

    /// Cancel a task: race the GPU pre-start window, escalate an OS
    /// signal against a CPU subprocess, or fall back to recording the
    /// cooperative request alone.
    pub fn cancel(self: &Arc<Self>, task_id: &str, force: bool) -> CancelOutcomeKind {
        let Some(snapshot) = self.progress.snapshot(task_id) else {
            return CancelOutcomeKind::NotFound;
        };
        if snapshot.status.is_terminal() {
            return CancelOutcomeKind::AlreadyTerminal;
        }

        let now_ms = self.clock.epoch_ms();

        if let Some((_, handle)) = self.gpu_jobs.remove(task_id) {
            if handle.try_cancel() {
                let (scheme_code, data_ref) =
                    self.task_meta.get(task_id).map(|e| e.clone()).unwrap_or_default();
                self.progress.mark_finished(
                    task_id,
                    &scheme_code,
                    &data_ref,
                    TaskStatus::Cancelled,
                    "Cancelled before start",
                    "",
                    now_ms,
                );
                self.deliver_cancelled_result(task_id);
                return CancelOutcomeKind::Cancelled;
            }
            // Already claimed by a worker thread: running GPU work cannot
            // be force-killed, only asked to stop at its next checkpoint.
            self.progress.request_cancel(task_id, now_ms);
            return CancelOutcomeKind::CancelRequested;
        }

        if self.process.is_running(task_id) {
            self.progress.request_cancel(task_id, now_ms);
            let process = self.process.clone();
            let task_id_owned = task_id.to_string();
            tokio::spawn(async move { process.notify_cancel_requested(&task_id_owned).await });

            return match if force { self.process.cancel(task_id) } else { self.process.cancel_graceful(task_id) } {
                CancelOutcome::Killed => CancelOutcomeKind::Cancelled,
                CancelOutcome::Terminating => CancelOutcomeKind::Terminating,
                CancelOutcome::NotFound => CancelOutcomeKind::NotFound,
            };
        }

        self.progress.request_cancel(task_id, now_ms);
        CancelOutcomeKind::CancelRequested
    }

    fn deliver_cancelled_result(self: &Arc<Self>, task_id: &str) {
        let sink = self.sink.clone();
        let task_id = TaskId::new(task_id);
        tokio::spawn(async move {
            let _ = sink.send_result(&task_id, TaskStatus::Cancelled, algo_sink::SinkValue::Text(String::new()), None).await;
        });
    }

    pub fn watch(self: &Arc<Self>, task_id: &str) -> Watcher {
        self.progress.register_watcher(task_id)
    }

    pub fn close_watch(self: &Arc<Self>, task_id: &str) {
        self.progress.close_watcher(task_id);
    }

    pub fn list_schemes(&self) -> Vec<Arc<AlgorithmDescriptor>> {
        self.registry.list()
    }

    pub async fn list_tasks(&self) -> Result<Vec<TaskRecord>, DispatchError> {
        Ok(self.store.list().await?)
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Option<TaskRecord>, DispatchError> {
        Ok(self.store.get(task_id).await?)
    }

    pub async fn task_counts(&self) -> Result<TaskCounts, DispatchError> {
        Ok(self.store.counts().await?)
    }

    pub fn has_gpu(&self) -> bool {
        self.hardware.has_gpu()
    }

    pub fn gpu_summary(&self) -> Option<String> {
        self.hardware.device_info().summary.clone()
    }

    pub fn metrics(&self) -> DispatcherMetrics {
        self.counters.snapshot()
    }
}

fn worker_args(task_id: &str, scheme_code: &str, data_ref: &str, params: &serde_json::Value) -> Vec<String> {
    vec![
        "--task-id".to_string(),
        task_id.to_string(),
        "--scheme-code".to_string(),
        scheme_code.to_string(),
        "--data-ref".to_string(),
        data_ref.to_string(),
        "--params".to_string(),
        params.to_string(),
    ]
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
