// SPDX-License-Identifier: MIT

//! `algo-daemon`: the Control Service binary. Loads configuration, wires
//! the registry/store/progress/process/hardware/sink stack into a
//! `Dispatcher`, and serves it over the length-prefixed TCP protocol
//! until asked to shut down.

mod logging;
mod server;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use algo_core::SystemClock;
use algo_dispatcher::Dispatcher;
use algo_process::ProcessManager;
use algo_progress::ProgressManager;
use algo_registry::{HardwareManager, Registry};
use algo_sink::ResultSinkClient;
use algo_store::TaskStore;
use tokio::net::TcpListener;

const GRACEFUL_SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_secs(2);

fn print_help() {
    println!("algo-daemon — the Control Service for the algorithm execution platform");
    println!();
    println!("USAGE:");
    println!("    algo-daemon [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       print this help text");
    println!("    -V, --version    print the daemon version");
    println!();
    println!("Configuration is read from environment variables (ALGO_GRPC_HOST,");
    println!("ALGO_GRPC_PORT, ALGO_DATA_DIR, ALGO_RESULT_DIR, ALGO_LOG_DIR,");
    println!("ALGO_PLUGIN_ROOT, RESULT_REPORTER_TARGET) or ALGO_CONFIG_PATH.");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        return Ok(());
    }
    if args.iter().any(|a| a == "-V" || a == "--version") {
        println!("algo-daemon {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = match std::env::var("ALGO_CONFIG_PATH") {
        Ok(path) => algo_core::AppConfig::load(&PathBuf::from(path)),
        Err(_) => algo_core::AppConfig::from_env(),
    };

    let _log_guard = logging::init(&config.log_dir)?;
    tracing::info!(host = %config.grpc_host, port = config.grpc_port, "starting algo-daemon");

    let registry = Arc::new(Registry::new());
    algo_plugins::register_all(&registry);
    tracing::info!(schemes = registry.len(), "registered algorithm schemes");

    let store = TaskStore::connect(&config.task_db_path()).await?;
    let (progress, _writer_handle) = ProgressManager::spawn(store.clone());
    let hardware = Arc::new(HardwareManager::detect());
    tracing::info!(gpu = hardware.has_gpu(), "hardware probe complete");

    let sink = Arc::new(ResultSinkClient::new(config.result_dir.clone(), config.result_reporter_target.clone()));
    let process = ProcessManager::new(progress.clone(), sink.clone(), hardware.cpu_worker_count(), SystemClock);

    let worker_binary = resolve_worker_binary();
    let dispatcher = Dispatcher::new(registry, store, progress, process.clone(), hardware, sink, SystemClock, worker_binary);

    let addr = format!("{}:{}", config.grpc_host, config.grpc_port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    let ctx = Arc::new(server::ServerCtx { dispatcher, config: config.snapshot(), start_time: Instant::now() });

    let serve = tokio::spawn(server::run(listener, ctx));

    wait_for_shutdown_signal().await?;
    tracing::info!("shutdown signal received, draining in-flight tasks");
    serve.abort();
    process.shutdown(true, GRACEFUL_SHUTDOWN_GRACE > std::time::Duration::ZERO).await;
    tracing::info!("algo-daemon shut down");
    Ok(())
}

/// The worker binary lives alongside the daemon in a normal cargo build
/// layout. `ALGO_WORKER_BIN` overrides this for development or
/// non-standard installs.
fn resolve_worker_binary() -> PathBuf {
    if let Ok(path) = std::env::var("ALGO_WORKER_BIN") {
        return PathBuf::from(path);
    }
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|dir| dir.join("algo-worker")))
        .unwrap_or_else(|| PathBuf::from("algo-worker"))
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    let _ = tokio::signal::ctrl_c().await;
    Ok(())
}
