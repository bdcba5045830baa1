// SPDX-License-Identifier: MIT

//! `algo-worker`: the per-task CPU executor the Process Manager forks for
//! every CPU-bound submission.
//!
//! A forked process starts with none of the parent's in-memory state, so
//! this binary re-registers every built-in algorithm from scratch (the
//! same `algo_plugins::register_all` pass the daemon runs at startup)
//! before it can build the one it was asked to run. It reports progress
//! and its terminal outcome to the parent over stdout as newline-delimited
//! `ChildMessage` frames — the subprocess half of the IPC boundary
//! `algo-wire` defines alongside the length-prefixed control protocol.

mod logging;

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use algo_core::{AlgoError, AppConfig, DataLoader, ExecutionContext, Reporter, TaskId, TaskStatus, UrlDataLoader};
use algo_registry::Registry;
use algo_wire::{ChildMessage, ParentMessage};

struct Args {
    task_id: String,
    scheme_code: String,
    data_ref: String,
    params: serde_json::Value,
}

/// Parses the flags `Dispatcher::worker_args` constructs: `--task-id`,
/// `--scheme-code`, `--data-ref`, `--params`. Any order is accepted.
fn parse_args() -> anyhow::Result<Args> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from(args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut task_id = None;
    let mut scheme_code = None;
    let mut data_ref = None;
    let mut params = serde_json::json!({});

    let mut iter = args;
    while let Some(flag) = iter.next() {
        let value = iter.next().ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
        match flag.as_str() {
            "--task-id" => task_id = Some(value),
            "--scheme-code" => scheme_code = Some(value),
            "--data-ref" => data_ref = Some(value),
            // A malformed `--params` payload yields empty params rather
            // than failing the task outright — the same "parse errors
            // yield empty params (not a rejection)" contract `SubmitTask`
            // applies one layer up, at the control-protocol boundary.
            "--params" => params = serde_json::from_str(&value).unwrap_or_else(|_| serde_json::json!({})),
            other => anyhow::bail!("unrecognized argument: {other}"),
        }
    }

    Ok(Args {
        task_id: task_id.ok_or_else(|| anyhow::anyhow!("missing --task-id"))?,
        scheme_code: scheme_code.ok_or_else(|| anyhow::anyhow!("missing --scheme-code"))?,
        data_ref: data_ref.ok_or_else(|| anyhow::anyhow!("missing --data-ref"))?,
        params,
    })
}

/// Writes `ChildMessage::Progress` frames to stdout and raises
/// `AlgoError::Cancelled` the moment the cancel-watcher thread has
/// observed a `ParentMessage::CancelRequested` frame on stdin — the
/// subprocess-side half of the cooperative-cancel contract every
/// `Reporter` implementation follows.
struct StdoutReporter {
    cancelled: Arc<AtomicBool>,
}

impl Reporter for StdoutReporter {
    fn update(&self, percentage: u8, message: &str) -> Result<(), AlgoError> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(AlgoError::Cancelled);
        }
        write_frame(&ChildMessage::Progress { percentage, message: message.to_string() });
        Ok(())
    }
}

fn write_frame(message: &ChildMessage) {
    let Ok(mut line) = serde_json::to_vec(message) else { return };
    line.push(b'\n');
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(&line);
    let _ = stdout.flush();
}

/// Blocks on stdin, parsing `ParentMessage` frames until EOF, flipping
/// the returned flag the moment a `CancelRequested` frame arrives. Runs
/// on its own thread since stdin reads are blocking and the main thread
/// is busy running the algorithm.
fn spawn_cancel_watcher() -> Arc<AtomicBool> {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    std::thread::spawn(move || {
        use std::io::BufRead;
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if serde_json::from_str::<ParentMessage>(line.trim()).is_ok() {
                flag.store(true, Ordering::SeqCst);
            }
        }
    });
    cancelled
}

/// Resolves the scheme, loads its data, and runs `execute` to completion.
/// Returns the terminal status, human message, error detail, and result
/// payload the `Finished` frame carries back to the Process Manager.
fn run(registry: &Registry, args: &Args, reporter: &StdoutReporter) -> (TaskStatus, String, String, serde_json::Value) {
    let algorithm = match registry.build(&args.scheme_code) {
        Ok(algorithm) => algorithm,
        Err(err) => return (TaskStatus::Failed, "Failed".to_string(), err.to_string(), serde_json::Value::Null),
    };

    let (data, _meta) = match UrlDataLoader::default().load(&args.data_ref) {
        Ok(loaded) => loaded,
        Err(err) => return (TaskStatus::Failed, "Failed".to_string(), err.to_string(), serde_json::Value::Null),
    };

    let mut ctx = ExecutionContext::new(TaskId::new(args.task_id.clone()), args.params.clone(), data, reporter);
    match algorithm.execute(&mut ctx) {
        Ok(result) => (TaskStatus::Success, "Completed".to_string(), String::new(), result),
        Err(AlgoError::Cancelled) => {
            (TaskStatus::Cancelled, "Cancelled".to_string(), String::new(), serde_json::Value::Null)
        }
        Err(AlgoError::Failed(message)) => (TaskStatus::Failed, "Failed".to_string(), message, serde_json::Value::Null),
    }
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    let config = AppConfig::from_env();
    let _log_guard = logging::init(&config.log_dir)?;

    tracing::info!(task_id = %args.task_id, scheme_code = %args.scheme_code, "algo-worker starting");

    let registry = Registry::new();
    algo_plugins::register_all(&registry);

    let cancelled = spawn_cancel_watcher();
    let reporter = StdoutReporter { cancelled };

    let (status, message, error_message, data) = run(&registry, &args, &reporter);
    tracing::info!(task_id = %args.task_id, %status, "algo-worker finished");

    write_frame(&ChildMessage::Finished { status, message, error_message, data });
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
