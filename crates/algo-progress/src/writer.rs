// SPDX-License-Identifier: MIT

//! The durable-write queue and its single background drainer. The DB
//! writer runs only in the parent process, never inside a CPU worker
//! subprocess.

use algo_core::{FailureCounters, TaskStatus};
use algo_store::TaskStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// One durable-write request enqueued by a producer (in-process GPU
/// runner, or the per-child stdout reader forwarding a subprocess's
/// frames) and applied by the single DB-writer task.
#[derive(Debug, Clone)]
pub enum WriteOp {
    UpsertStart { task_id: String, scheme_code: String, data_ref: String, now_ms: i64 },
    Progress {
        task_id: String,
        scheme_code: String,
        data_ref: String,
        percentage: u8,
        message: String,
        now_ms: i64,
    },
    CancelRequested { task_id: String, now_ms: i64 },
    Finish {
        task_id: String,
        scheme_code: String,
        data_ref: String,
        status: TaskStatus,
        message: String,
        error_message: String,
        now_ms: i64,
    },
}

#[derive(Default)]
pub(crate) struct Counters {
    succeeded: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    pub(crate) fn snapshot(&self) -> FailureCounters {
        FailureCounters {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Drain `rx` forever, applying each event to `store` with the retry
/// policy already built into `TaskStore`'s own methods. After a failed
/// apply (the store having exhausted its own retries), increment the
/// failure counter, drop the event, and continue. Channel closure (every
/// sender dropped) is the normal termination signal, not an error.
pub(crate) async fn run(store: TaskStore, mut rx: UnboundedReceiver<WriteOp>, counters: Arc<Counters>) {
    while let Some(op) = rx.recv().await {
        let result = apply(&store, op).await;
        match result {
            Ok(()) => {
                counters.succeeded.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %err, "db writer dropped a write after exhausting retries");
            }
        }
    }
    tracing::debug!("db writer channel closed, exiting");
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;

async fn apply(store: &TaskStore, op: WriteOp) -> Result<(), algo_store::StoreError> {
    match op {
        WriteOp::UpsertStart { task_id, scheme_code, data_ref, now_ms } => {
            store.upsert_start(&task_id, &scheme_code, &data_ref, now_ms).await
        }
        WriteOp::Progress { task_id, scheme_code, data_ref, percentage, message, now_ms } => {
            store.update_progress(&task_id, &scheme_code, &data_ref, percentage, &message, now_ms).await
        }
        WriteOp::CancelRequested { task_id, now_ms } => store.mark_cancel_requested(&task_id, now_ms).await,
        WriteOp::Finish { task_id, scheme_code, data_ref, status, message, error_message, now_ms } => {
            store.finish(&task_id, &scheme_code, &data_ref, status, &message, &error_message, now_ms).await
        }
    }
}
