// SPDX-License-Identifier: MIT

//! The Process Manager itself: `task_id -> ManagedProcess`, a
//! counting semaphore bounding concurrency, and per-child monitor/reader
//! tasks that keep the Progress Manager informed without sharing memory
//! with the subprocess.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use algo_core::{Clock, TaskId, TaskStatus};
use algo_progress::ProgressManager;
use algo_sink::{ResultSinkClient, SinkValue};
use algo_wire::{read_child_message, ChildMessage, ParentMessage};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::io::BufReader;
use tokio::process::{ChildStdin, Command};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// A process the escalator gives this long to exit after `SIGTERM` before
/// it force-kills with `SIGKILL`.
const TERMINATE_GRACE_PERIOD: Duration = Duration::from_secs(5);
/// Upper bound on how long `shutdown` waits for any single task to join.
const SHUTDOWN_JOIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("process manager is shutting down")]
    ShuttingDown,
    #[error("failed to spawn process: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("spawned child was missing a stdio handle")]
    MissingStdio,
    #[error("concurrency semaphore was closed during shutdown")]
    SemaphoreClosed,
}

/// Outcome of [`ProcessManager::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// `force=true`: `SIGKILL` sent immediately.
    Killed,
    /// `force=false`: `SIGTERM` sent; an escalator will force-kill after
    /// [`TERMINATE_GRACE_PERIOD`] if the process is still alive.
    Terminating,
    /// The task is not tracked (unknown id or already exited).
    NotFound,
}

struct ManagedProcess {
    pid: i32,
    started_at_ms: i64,
    stdin: Arc<tokio::sync::Mutex<ChildStdin>>,
    cancel_requested: bool,
}

/// Singleton owning every live CPU subprocess. Shared via `Arc`.
pub struct ProcessManager<C: Clock> {
    clock: C,
    progress: Arc<ProgressManager>,
    sink: Arc<ResultSinkClient>,
    tasks: Mutex<HashMap<String, ManagedProcess>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    semaphore: Arc<Semaphore>,
    shutting_down: AtomicBool,
}

impl<C: Clock> ProcessManager<C> {
    /// `worker_count` is `max(1, cores - 2)`, as sized by the caller via
    /// `HardwareManager::cpu_worker_count()`. `sink` is the same Result
    /// Sink Client the dispatcher hands every other executor, so a CPU
    /// task's terminal report goes through one code path regardless of
    /// whether the worker reported cleanly or had to be synthesized after
    /// a crash or a force-kill.
    pub fn new(progress: Arc<ProgressManager>, sink: Arc<ResultSinkClient>, worker_count: usize, clock: C) -> Arc<Self> {
        Arc::new(Self {
            clock,
            progress,
            sink,
            tasks: Mutex::new(HashMap::new()),
            handles: Mutex::new(Vec::new()),
            semaphore: Arc::new(Semaphore::new(worker_count.max(1))),
            shutting_down: AtomicBool::new(false),
        })
    }

    /// `submit(target, task_id, args)`: acquire the concurrency permit
    /// (blocks when at capacity), fork the subprocess, and hand its
    /// stdout off to a reader task that forwards `ChildMessage` frames
    /// into the Progress Manager.
    pub async fn submit(
        self: &Arc<Self>,
        task_id: &str,
        scheme_code: &str,
        data_ref: &str,
        program: &str,
        args: &[String],
    ) -> Result<(), ProcessError> {
        if self.shutting_down.load(Ordering::SeqCst) {
            return Err(ProcessError::ShuttingDown);
        }

        let permit = self.semaphore.clone().acquire_owned().await.map_err(|_| ProcessError::SemaphoreClosed)?;

        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::piped()).stdout(Stdio::piped()).kill_on_drop(true);
        let mut child = command.spawn().map_err(ProcessError::Spawn)?;
        let pid = child.id().ok_or(ProcessError::MissingStdio)? as i32;
        let stdin = child.stdin.take().ok_or(ProcessError::MissingStdio)?;
        let stdout = child.stdout.take().ok_or(ProcessError::MissingStdio)?;

        let now_ms = self.clock.epoch_ms();
        self.tasks
            .lock()
            .insert(
                task_id.to_string(),
                ManagedProcess { pid, started_at_ms: now_ms, stdin: Arc::new(tokio::sync::Mutex::new(stdin)), cancel_requested: false },
            );

        let this = self.clone();
        let task_id = task_id.to_string();
        let scheme_code = scheme_code.to_string();
        let data_ref = data_ref.to_string();
        let handle = tokio::spawn(async move {
            this.run_monitor(child, stdout, permit, task_id, scheme_code, data_ref).await;
        });
        self.handles.lock().push(handle);
        Ok(())
    }

    /// Owns one child end-to-end: forwards its stdout frames, waits for
    /// exit, releases the semaphore permit exactly once, and synthesizes a
    /// terminal write if the child never reported one itself (crash, or
    /// force-kill) — the permit is released exactly once regardless of
    /// how the subprocess died.
    async fn run_monitor(
        self: Arc<Self>,
        mut child: tokio::process::Child,
        stdout: tokio::process::ChildStdout,
        permit: tokio::sync::OwnedSemaphorePermit,
        task_id: String,
        scheme_code: String,
        data_ref: String,
    ) {
        let finished = Arc::new(AtomicBool::new(false));
        let clock = self.clock.clone();
        let reader_handle = tokio::spawn(forward_child_frames(
            stdout,
            self.progress.clone(),
            self.sink.clone(),
            task_id.clone(),
            scheme_code.clone(),
            data_ref.clone(),
            finished.clone(),
            clock,
        ));

        let wait_result = child.wait().await;
        let _ = reader_handle.await;

        let cancel_requested = self.tasks.lock().remove(&task_id).map(|p| p.cancel_requested).unwrap_or(false);

        if !finished.load(Ordering::SeqCst) {
            // A dead worker reports nothing of its own — the outcome it
            // would have written (`CANCELLED` if we asked it to stop,
            // `FAILED` for a bare crash) is synthesized here instead, and
            // this is also the only point that can still call the sink,
            // since the worker itself no longer exists to do it.
            let (status, message) = if cancel_requested {
                (TaskStatus::Cancelled, "process terminated by cancel request".to_string())
            } else {
                let detail = match wait_result {
                    Ok(status) => format!("process exited ({status}) without reporting a final status"),
                    Err(err) => format!("failed to wait on process: {err}"),
                };
                (TaskStatus::Failed, detail)
            };
            let now_ms = self.clock.epoch_ms();
            let error_message = if status == TaskStatus::Failed { message.clone() } else { String::new() };
            self.progress.mark_finished(&task_id, &scheme_code, &data_ref, status, &message, &error_message, now_ms);

            let sink = self.sink.clone();
            let task_id_owned = TaskId::new(task_id.clone());
            let error = if error_message.is_empty() { None } else { Some(error_message) };
            tokio::spawn(async move {
                let _ = sink.send_result(&task_id_owned, status, SinkValue::Text(String::new()), error.as_deref()).await;
            });
        }

        drop(permit);
    }

    /// `cancel(task_id, force)`.
    pub fn cancel(self: &Arc<Self>, task_id: &str) -> CancelOutcome {
        self.cancel_inner(task_id, true)
    }

    /// `cancel(task_id, force=false)`: `SIGTERM` now, `SIGKILL` after
    /// [`TERMINATE_GRACE_PERIOD`] if the process is still tracked.
    pub fn cancel_graceful(self: &Arc<Self>, task_id: &str) -> CancelOutcome {
        self.cancel_inner(task_id, false)
    }

    fn cancel_inner(self: &Arc<Self>, task_id: &str, force: bool) -> CancelOutcome {
        let pid = {
            let mut tasks = self.tasks.lock();
            match tasks.get_mut(task_id) {
                Some(entry) => {
                    entry.cancel_requested = true;
                    entry.pid
                }
                None => return CancelOutcome::NotFound,
            }
        };

        let signal = if force { Signal::SIGKILL } else { Signal::SIGTERM };
        let _ = kill(Pid::from_raw(pid), signal);

        if force {
            return CancelOutcome::Killed;
        }

        let this = self.clone();
        let task_id = task_id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(TERMINATE_GRACE_PERIOD).await;
            if this.is_running(&task_id) {
                let _ = this.tasks.lock().get(&task_id).map(|entry| kill(Pid::from_raw(entry.pid), Signal::SIGKILL));
            }
        });
        CancelOutcome::Terminating
    }

    /// Best-effort cooperative-cancel notification to the child over its
    /// stdin: mirrors the in-process status-map check GPU tasks use
    /// directly. Swallows failures — the OS-level `cancel` path is the
    /// fallback that guarantees termination regardless.
    pub async fn notify_cancel_requested(&self, task_id: &str) {
        let stdin = { self.tasks.lock().get(task_id).map(|entry| entry.stdin.clone()) };
        let Some(stdin) = stdin else { return };

        let mut json = match serde_json::to_vec(&ParentMessage::CancelRequested) {
            Ok(bytes) => bytes,
            Err(_) => return,
        };
        json.push(b'\n');

        use tokio::io::AsyncWriteExt as _;
        let mut guard = stdin.lock().await;
        if guard.write_all(&json).await.is_ok() {
            let _ = guard.flush().await;
        }
    }

    pub fn is_running(&self, task_id: &str) -> bool {
        self.tasks.lock().contains_key(task_id)
    }

    pub fn running_tasks(&self) -> Vec<String> {
        self.tasks.lock().keys().cloned().collect()
    }

    /// `shutdown(wait, cancel_pending)`: optionally force-cancel every
    /// tracked task, then optionally join every monitor handle, each
    /// bounded at [`SHUTDOWN_JOIN_TIMEOUT`].
    pub async fn shutdown(self: &Arc<Self>, wait: bool, cancel_pending: bool) {
        self.shutting_down.store(true, Ordering::SeqCst);

        if cancel_pending {
            for task_id in self.running_tasks() {
                self.cancel(&task_id);
            }
        }

        if wait {
            let handles = std::mem::take(&mut *self.handles.lock());
            for handle in handles {
                let _ = tokio::time::timeout(SHUTDOWN_JOIN_TIMEOUT, handle).await;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn forward_child_frames<C: Clock>(
    stdout: tokio::process::ChildStdout,
    progress: Arc<ProgressManager>,
    sink: Arc<ResultSinkClient>,
    task_id: String,
    scheme_code: String,
    data_ref: String,
    finished: Arc<AtomicBool>,
    clock: C,
) {
    let mut reader = BufReader::new(stdout);
    loop {
        match read_child_message(&mut reader).await {
            Ok(Some(ChildMessage::Progress { percentage, message })) => {
                let now_ms = clock.epoch_ms();
                let _ = progress.record_progress(&task_id, &scheme_code, &data_ref, percentage, &message, now_ms);
            }
            Ok(Some(ChildMessage::Finished { status, message, error_message, data })) => {
                finished.store(true, Ordering::SeqCst);
                let now_ms = clock.epoch_ms();
                progress.mark_finished(&task_id, &scheme_code, &data_ref, status, &message, &error_message, now_ms);

                let error = Option::from(error_message).filter(|s: &String| !s.is_empty());
                let task_id_owned = TaskId::new(task_id.clone());
                if let Err(err) = sink.send_result(&task_id_owned, status, SinkValue::Json(data), error.as_deref()).await {
                    tracing::warn!(%task_id, error = %err, "failed to write local result artifact");
                }
                return;
            }
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(error = %err, %task_id, "malformed child frame, ignoring");
            }
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
