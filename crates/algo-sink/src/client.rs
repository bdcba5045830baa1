// SPDX-License-Identifier: MIT

//! The Result Sink Client: writes the authoritative local result artifact
//! and, when a remote target is configured, makes a best-effort attempt to
//! forward the same payload over HTTP.
//!
//! The local artifact is authoritative — a task is considered reported the
//! moment its file lands on disk. Remote delivery is advisory: failures are
//! logged and swallowed rather than surfaced to the dispatcher, since a
//! down or misconfigured remote sink must not turn a successful task into
//! a failure report.

use std::path::PathBuf;

use algo_core::{TaskId, TaskStatus};
use serde::Serialize;
use thiserror::Error;

use crate::value::SinkValue;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create result directory {path}: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },
    #[error("failed to write result artifact {path}: {source}")]
    WriteArtifact { path: PathBuf, source: std::io::Error },
    #[error("failed to serialize result artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The payload written to `<result_dir>/<task_id>.json`, and the body of
/// the remote POST when a remote target is configured.
#[derive(Debug, Serialize)]
struct ResultReport<'a> {
    task_id: &'a str,
    status: TaskStatus,
    data: &'a SinkValue,
    error: &'a str,
}

/// Delivers a task's terminal result to its local artifact and, optionally,
/// a remote HTTP endpoint.
pub struct ResultSinkClient {
    result_dir: PathBuf,
    remote_target: Option<String>,
    http: reqwest::Client,
}

impl ResultSinkClient {
    pub fn new(result_dir: PathBuf, remote_target: Option<String>) -> Self {
        Self { result_dir, remote_target, http: reqwest::Client::new() }
    }

    /// Write the local artifact, then best-effort forward it remotely.
    ///
    /// Returns an error only when the local write fails — the one outcome
    /// that actually leaves the task unreported.
    pub async fn send_result(
        &self,
        task_id: &TaskId,
        status: TaskStatus,
        data: SinkValue,
        error: Option<&str>,
    ) -> Result<(), SinkError> {
        let report = ResultReport { task_id: task_id.as_str(), status, data: &data, error: error.unwrap_or("") };
        self.write_local(task_id, &report)?;
        self.send_remote(task_id, &report).await;
        Ok(())
    }

    fn write_local(&self, task_id: &TaskId, report: &ResultReport<'_>) -> Result<(), SinkError> {
        std::fs::create_dir_all(&self.result_dir)
            .map_err(|source| SinkError::CreateDir { path: self.result_dir.clone(), source })?;
        let path = self.result_dir.join(format!("{}.json", task_id.as_str()));
        let bytes = serde_json::to_vec_pretty(report)?;
        std::fs::write(&path, bytes).map_err(|source| SinkError::WriteArtifact { path, source })
    }

    async fn send_remote(&self, task_id: &TaskId, report: &ResultReport<'_>) {
        let Some(target) = self.remote_target.as_deref() else {
            return;
        };
        match self.http.post(target).json(report).send().await {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!(
                    task_id = %task_id,
                    target,
                    status = %response.status(),
                    "remote result sink rejected the report"
                );
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(task_id = %task_id, target, error = %err, "remote result sink unreachable");
            }
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
