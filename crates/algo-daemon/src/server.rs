// SPDX-License-Identifier: MIT

//! Control Service listener: accepts TCP connections and translates each
//! `algo_wire::Request` into a `Dispatcher` call, replying with the
//! matching `Response`.

use std::sync::Arc;
use std::time::Instant;

use algo_core::{Clock, ConfigSnapshot};
use algo_dispatcher::{CancelOutcomeKind, Dispatcher};
use algo_wire::{read_message, write_message, CancelStatus, GpuAvailability, HealthStatus, Request, Response, SchemeInfo, WireError};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

pub struct ServerCtx<C: Clock> {
    pub dispatcher: Arc<Dispatcher<C>>,
    pub config: ConfigSnapshot,
    pub start_time: Instant,
}

/// Accept connections on `listener` until the process is asked to stop.
/// Each connection gets its own spawned task so a slow or stuck client
/// never blocks others.
pub async fn run<C: Clock + 'static>(listener: TcpListener, ctx: Arc<ServerCtx<C>>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!(%addr, "accepted connection");
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    let (mut reader, mut writer) = stream.into_split();
                    if let Err(err) = handle_connection(&mut reader, &mut writer, &ctx).await {
                        log_connection_error(err);
                    }
                });
            }
            Err(err) => error!(error = %err, "accept error"),
        }
    }
}

fn log_connection_error(err: WireError) {
    match err {
        WireError::ConnectionClosed => debug!("client disconnected"),
        other => warn!(error = %other, "connection error"),
    }
}

async fn handle_connection<R, W>(reader: &mut R, writer: &mut W, ctx: &ServerCtx<impl Clock>) -> Result<(), WireError>
where
    R: tokio::io::AsyncReadExt + Unpin,
    W: tokio::io::AsyncWriteExt + Unpin,
{
    let request: Request = read_message(reader).await?;
    info!(?request, "received request");

    match request {
        Request::WatchTaskProgress { task_id } => stream_watch(writer, ctx, &task_id).await,
        other => {
            let response = handle_request(other, ctx).await;
            write_message(writer, &response).await
        }
    }
}

async fn handle_request(request: Request, ctx: &ServerCtx<impl Clock>) -> Response {
    match request {
        Request::GetAvailableSchemes => {
            let schemes = ctx.dispatcher.list_schemes().iter().map(|d| SchemeInfo::from(d.as_ref())).collect();
            Response::Schemes { schemes }
        }

        Request::SubmitTask { task_id, scheme_code, data_ref, params } => {
            ctx.dispatcher.submit(&task_id, &scheme_code, &data_ref, params).await;
            Response::Submitted { task_id }
        }

        Request::CancelTask { task_id, force } => {
            let status = match ctx.dispatcher.cancel(&task_id, force) {
                CancelOutcomeKind::Cancelled => CancelStatus::Cancelled,
                CancelOutcomeKind::Terminating => CancelStatus::Terminating,
                CancelOutcomeKind::CancelRequested => CancelStatus::CancelRequested,
                CancelOutcomeKind::AlreadyTerminal => CancelStatus::AlreadyTerminal,
                CancelOutcomeKind::NotFound => CancelStatus::NotFound,
            };
            Response::Cancelled { status }
        }

        Request::CheckHealth => {
            let gpu = match ctx.dispatcher.gpu_summary() {
                Some(summary) => GpuAvailability::Available { summary },
                None if ctx.dispatcher.has_gpu() => GpuAvailability::Available { summary: String::new() },
                None => GpuAvailability::Unavailable,
            };
            Response::Health {
                status: HealthStatus::Serving,
                gpu,
                config: ctx.config.clone(),
                metrics: ctx.dispatcher.metrics(),
            }
        }

        Request::ListTasks => match ctx.dispatcher.list_tasks().await {
            Ok(tasks) => Response::Tasks { tasks },
            Err(err) => Response::Error { message: err.to_string() },
        },

        Request::GetTaskStatus { task_id } => match ctx.dispatcher.get_task(&task_id).await {
            Ok(task) => Response::Task { task },
            Err(err) => Response::Error { message: err.to_string() },
        },

        Request::WatchTaskProgress { .. } => unreachable!("handled by stream_watch"),
    }
}

/// Stream `Response::Progress` frames for `task_id` until its percentage
/// reaches 100 or its status goes terminal, then send a final
/// `Response::Done` and return.
async fn stream_watch<W>(writer: &mut W, ctx: &ServerCtx<impl Clock>, task_id: &str) -> Result<(), WireError>
where
    W: tokio::io::AsyncWriteExt + Unpin,
{
    let mut watcher = ctx.dispatcher.watch(task_id);
    while let Some(event) = watcher.next().await {
        let done = event.percentage >= 100
            || ctx.dispatcher.get_task(task_id).await.ok().flatten().map(|t| t.status.is_terminal()).unwrap_or(false);
        write_message(writer, &Response::Progress(event)).await?;
        if done {
            break;
        }
    }
    ctx.dispatcher.close_watch(task_id);
    write_message(writer, &Response::Done).await
}
