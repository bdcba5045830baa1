// SPDX-License-Identifier: MIT

//! Thin client over the Control Service's length-prefixed wire protocol.
//! Every call opens a fresh TCP connection, sends one `Request`, and reads
//! back either a single `Response` or — for `watch` — a stream of them.

use algo_wire::{read_message, write_message, Request, Response, WireError};
use thiserror::Error;
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Connect { addr: String, #[source] source: std::io::Error },
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error("daemon returned an error: {0}")]
    Server(String),
    #[error("daemon replied with an unexpected response for this request")]
    UnexpectedResponse,
}

pub struct DaemonClient {
    addr: String,
}

impl DaemonClient {
    pub fn new(host: &str, port: u16) -> Self {
        Self { addr: format!("{host}:{port}") }
    }

    async fn connect(&self) -> Result<TcpStream, ClientError> {
        TcpStream::connect(&self.addr).await.map_err(|source| ClientError::Connect { addr: self.addr.clone(), source })
    }

    async fn call(&self, request: &Request) -> Result<Response, ClientError> {
        let mut stream = self.connect().await?;
        write_message(&mut stream, request).await?;
        let response: Response = read_message(&mut stream).await?;
        if let Response::Error { message } = response {
            return Err(ClientError::Server(message));
        }
        Ok(response)
    }

    /// Opens its own connection and streams every `Response::Progress`
    /// frame to `on_event` until the server sends `Response::Done`.
    pub async fn watch(&self, task_id: &str, mut on_event: impl FnMut(algo_core::ProgressEvent)) -> Result<(), ClientError> {
        let mut stream = self.connect().await?;
        write_message(&mut stream, &Request::WatchTaskProgress { task_id: task_id.to_string() }).await?;
        loop {
            match read_message(&mut stream).await? {
                Response::Progress(event) => on_event(event),
                Response::Done => return Ok(()),
                Response::Error { message } => return Err(ClientError::Server(message)),
                _ => return Err(ClientError::UnexpectedResponse),
            }
        }
    }

    pub async fn schemes(&self) -> Result<Vec<algo_wire::SchemeInfo>, ClientError> {
        match self.call(&Request::GetAvailableSchemes).await? {
            Response::Schemes { schemes } => Ok(schemes),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn submit(
        &self,
        task_id: &str,
        scheme_code: &str,
        data_ref: &str,
        params: serde_json::Value,
    ) -> Result<String, ClientError> {
        let request =
            Request::SubmitTask { task_id: task_id.to_string(), scheme_code: scheme_code.to_string(), data_ref: data_ref.to_string(), params };
        match self.call(&request).await? {
            Response::Submitted { task_id } => Ok(task_id),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn cancel(&self, task_id: &str, force: bool) -> Result<algo_wire::CancelStatus, ClientError> {
        match self.call(&Request::CancelTask { task_id: task_id.to_string(), force }).await? {
            Response::Cancelled { status } => Ok(status),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn health(&self) -> Result<Response, ClientError> {
        let response = self.call(&Request::CheckHealth).await?;
        match response {
            Response::Health { .. } => Ok(response),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn list_tasks(&self) -> Result<Vec<algo_core::TaskRecord>, ClientError> {
        match self.call(&Request::ListTasks).await? {
            Response::Tasks { tasks } => Ok(tasks),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Option<algo_core::TaskRecord>, ClientError> {
        match self.call(&Request::GetTaskStatus { task_id: task_id.to_string() }).await? {
            Response::Task { task } => Ok(task),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}
