// SPDX-License-Identifier: MIT

//! Rotating file logging for the worker subprocess, matching the
//! daemon's own `tracing` + `tracing-subscriber` + `tracing-appender`
//! stack. Logged to its own file rather than the daemon's, since several
//! workers can be alive at once and `tracing-appender`'s rolling writer
//! does not coordinate writes across processes.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize a non-blocking, daily-rolling file subscriber under
/// `log_dir`. Returns the `WorkerGuard` that must be kept alive for the
/// life of the process — dropping it stops the background flush thread.
pub fn init(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let appender = tracing_appender::rolling::daily(log_dir, "algo-worker.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}
