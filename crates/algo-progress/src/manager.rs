// SPDX-License-Identifier: MIT

//! The Progress Manager itself: status map + per-task progress
//! channel + durable-write queue, wired to a single background writer.

use std::sync::Arc;

use algo_core::{transition, FailureCounters, ProgressEvent, TaskId, TaskStatus, TaskStatusSnapshot};
use algo_store::TaskStore;
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::watcher::Watcher;
use crate::writer::{self, Counters, WriteOp};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("task was cancelled")]
    Cancelled,
}

pub struct ProgressManager {
    status: DashMap<String, TaskStatusSnapshot>,
    channels: DashMap<String, broadcast::Sender<ProgressEvent>>,
    writer_tx: mpsc::UnboundedSender<WriteOp>,
    counters: Arc<Counters>,
}

impl ProgressManager {
    /// Construct the manager and spawn the single background DB writer.
    /// The returned `JoinHandle` resolves once the writer's channel is
    /// closed (every `Arc<ProgressManager>` dropped).
    pub fn spawn(store: TaskStore) -> (Arc<Self>, JoinHandle<()>) {
        let (writer_tx, writer_rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());
        let handle = tokio::spawn(writer::run(store, writer_rx, counters.clone()));
        let manager = Arc::new(Self { status: DashMap::new(), channels: DashMap::new(), writer_tx, counters });
        (manager, handle)
    }

    /// Snapshot of the DB-writer's retry/drop counters.
    pub fn failure_counters(&self) -> FailureCounters {
        self.counters.snapshot()
    }

    /// Ensure a task's progress channel exists. Producer- and
    /// consumer-side calls both go through this so either side can be
    /// first.
    pub fn ensure_queue(&self, task_id: &str) {
        self.channels.entry(task_id.to_string()).or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
    }

    /// `register_task`: seed the status map with a fresh `RUNNING`
    /// snapshot and enqueue the durable `upsert_start` write.
    pub fn register_task(&self, task_id: &str, scheme_code: &str, data_ref: &str, now_ms: i64) {
        self.status.insert(task_id.to_string(), TaskStatusSnapshot::queued(TaskId::new(task_id), now_ms));
        self.ensure_queue(task_id);
        let _ = self.writer_tx.send(WriteOp::UpsertStart {
            task_id: task_id.to_string(),
            scheme_code: scheme_code.to_string(),
            data_ref: data_ref.to_string(),
            now_ms,
        });
    }

    /// Consulted by the reporter on every `update()` call before it does
    /// anything else: the reporter checks the status map first and raises
    /// a cancelled error if a cancel was requested.
    pub fn is_cancel_requested(&self, task_id: &str) -> bool {
        self.status.get(task_id).map(|s| s.is_cancel_requested()).unwrap_or(false)
    }

    /// `record_progress`: push an event to the channel and mirror it into
    /// the status map, then enqueue the durable write. Returns
    /// `Err(Cancelled)` if a cancel was already observed, matching the
    /// reporter's cooperative-cancel contract.
    pub fn record_progress(
        &self,
        task_id: &str,
        scheme_code: &str,
        data_ref: &str,
        percentage: u8,
        message: &str,
        now_ms: i64,
    ) -> Result<(), ProgressError> {
        if self.is_cancel_requested(task_id) {
            return Err(ProgressError::Cancelled);
        }

        let percentage = {
            let mut entry = self
                .status
                .entry(task_id.to_string())
                .or_insert_with(|| TaskStatusSnapshot::queued(TaskId::new(task_id), now_ms));
            if transition(entry.status, entry.percentage, TaskStatus::Running, percentage).is_err() {
                return Ok(()); // stale/out-of-order update against a terminal task; ignore
            }
            let percentage = percentage.max(entry.percentage);
            entry.status = TaskStatus::Running;
            entry.percentage = percentage;
            entry.message = message.to_string();
            entry.updated_at_ms = now_ms;
            percentage
        };

        self.ensure_queue(task_id);
        if let Some(sender) = self.channels.get(task_id) {
            let event = ProgressEvent {
                task_id: TaskId::new(task_id),
                percentage,
                message: message.to_string(),
                timestamp_ms: now_ms,
            };
            // No receivers is not an error: the channel may exist purely
            // because a producer created it before any watcher attached.
            let _ = sender.send(event);
        }

        let _ = self.writer_tx.send(WriteOp::Progress {
            task_id: task_id.to_string(),
            scheme_code: scheme_code.to_string(),
            data_ref: data_ref.to_string(),
            percentage,
            message: message.to_string(),
            now_ms,
        });
        Ok(())
    }

    /// `mark_finished`: write a terminal snapshot, push the final
    /// progress event, and enqueue the durable `finish` write.
    /// Idempotent: a task already terminal is left untouched.
    pub fn mark_finished(
        &self,
        task_id: &str,
        scheme_code: &str,
        data_ref: &str,
        status: TaskStatus,
        message: &str,
        error_message: &str,
        now_ms: i64,
    ) {
        {
            let mut entry = self
                .status
                .entry(task_id.to_string())
                .or_insert_with(|| TaskStatusSnapshot::queued(TaskId::new(task_id), now_ms));
            if entry.status.is_terminal() {
                return;
            }
            entry.status = status;
            entry.percentage = 100;
            entry.message = message.to_string();
            entry.updated_at_ms = now_ms;
        }

        self.ensure_queue(task_id);
        if let Some(sender) = self.channels.get(task_id) {
            let _ = sender.send(ProgressEvent {
                task_id: TaskId::new(task_id),
                percentage: 100,
                message: message.to_string(),
                timestamp_ms: now_ms,
            });
        }

        let _ = self.writer_tx.send(WriteOp::Finish {
            task_id: task_id.to_string(),
            scheme_code: scheme_code.to_string(),
            data_ref: data_ref.to_string(),
            status,
            message: message.to_string(),
            error_message: error_message.to_string(),
            now_ms,
        });
    }

    /// `request_cancel`: flip the status map to `CANCEL_REQUESTED` (no-op
    /// if already terminal) and enqueue the durable write, mirroring the
    /// cooperative cancel fallback's "set CANCEL_REQUESTED in status map +
    /// store".
    pub fn request_cancel(&self, task_id: &str, now_ms: i64) {
        {
            let mut entry = self
                .status
                .entry(task_id.to_string())
                .or_insert_with(|| TaskStatusSnapshot::queued(TaskId::new(task_id), now_ms));
            if entry.status.is_terminal() {
                return;
            }
            entry.status = TaskStatus::CancelRequested;
            entry.updated_at_ms = now_ms;
        }
        let _ = self.writer_tx.send(WriteOp::CancelRequested { task_id: task_id.to_string(), now_ms });
    }

    pub fn snapshot(&self, task_id: &str) -> Option<TaskStatusSnapshot> {
        self.status.get(task_id).map(|s| s.clone())
    }

    /// `register_watcher`: subscribe to the task's channel, synthesizing
    /// one replay event from the current status snapshot so a
    /// late-attaching watcher always observes at least one message.
    pub fn register_watcher(&self, task_id: &str) -> Watcher {
        let receiver = self
            .channels
            .entry(task_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();
        let synthetic = self
            .status
            .get(task_id)
            .map(|s| s.to_progress_event())
            .unwrap_or_else(|| ProgressEvent {
                task_id: TaskId::new(task_id),
                percentage: 0,
                message: "Unknown task".to_string(),
                timestamp_ms: 0,
            });
        Watcher::new(synthetic, receiver)
    }

    /// Garbage-collect a task's channel once no watchers remain attached.
    /// Safe to call any time; a no-op if watchers are still subscribed.
    pub fn close_watcher(&self, task_id: &str) {
        if let Some(sender) = self.channels.get(task_id) {
            if sender.receiver_count() == 0 {
                drop(sender);
                self.channels.remove(task_id);
            }
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
