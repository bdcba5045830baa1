// SPDX-License-Identifier: MIT

//! A watcher of one task's progress channel.

use std::time::Duration;

use algo_core::ProgressEvent;
use tokio::sync::broadcast;

/// Idle timeout on a watcher's channel: "Watchers block on the per-task
/// progress channel with a timeout (60 s in the reference design); expiry
/// without a terminal event closes the stream."
const WATCH_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Replays one synthetic event from the status-map snapshot at attach
/// time, then yields real events from the broadcast channel. This is
/// what makes "a late-attaching watcher always observes at least one
/// message" true without a stateful replay buffer.
pub struct Watcher {
    synthetic: Option<ProgressEvent>,
    receiver: broadcast::Receiver<ProgressEvent>,
}

impl Watcher {
    pub(crate) fn new(synthetic: ProgressEvent, receiver: broadcast::Receiver<ProgressEvent>) -> Self {
        Self { synthetic: Some(synthetic), receiver }
    }

    /// Await the next event: the synthetic replay first, then real
    /// broadcast events in producer order. Returns `None` once the
    /// channel is closed with no more events pending (the task's channel
    /// was dropped after the last watcher detached) or once 60s pass with
    /// no new event (silent-timeout close).
    pub async fn next(&mut self) -> Option<ProgressEvent> {
        if let Some(event) = self.synthetic.take() {
            return Some(event);
        }
        loop {
            let Ok(received) = tokio::time::timeout(WATCH_IDLE_TIMEOUT, self.receiver.recv()).await else {
                return None;
            };
            match received {
                Ok(event) => return Some(event),
                // A slow watcher can lag behind a bounded broadcast channel;
                // skip ahead rather than surface the lag as an error.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
