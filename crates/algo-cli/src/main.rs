// SPDX-License-Identifier: MIT

//! `algoctl`: a thin client over the Control Service's wire protocol.
//! Every subcommand opens its own connection, sends one request, prints
//! the reply, and exits — there is no persistent session state to manage.

mod client;
mod output;

use clap::{Parser, Subcommand};
use client::DaemonClient;

#[derive(Parser)]
#[command(name = "algoctl", about = "Control client for the algorithm execution service")]
struct Cli {
    /// Control Service host.
    #[arg(long, env = "ALGO_GRPC_HOST", default_value = "127.0.0.1")]
    host: String,
    /// Control Service port.
    #[arg(long, env = "ALGO_GRPC_PORT", default_value_t = 50051)]
    port: u16,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every registered algorithm scheme.
    Schemes,
    /// Submit a task.
    Submit {
        scheme_code: String,
        data_ref: String,
        /// JSON parameter bag; defaults to `{}`.
        #[arg(long, default_value = "{}")]
        params: String,
        /// Client-supplied task id; a UUID v4 is generated if omitted.
        #[arg(long)]
        task_id: Option<String>,
    },
    /// Request cancellation of a task.
    Cancel {
        task_id: String,
        /// Send SIGKILL immediately instead of SIGTERM-then-escalate.
        #[arg(long)]
        force: bool,
    },
    /// Stream progress for a task until it reaches a terminal state.
    Watch { task_id: String },
    /// Print one task's current record.
    Status { task_id: String },
    /// List every task the daemon knows about.
    List,
    /// Print daemon health and lifetime metrics.
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::new(&cli.host, cli.port);

    match cli.command {
        Command::Schemes => {
            let schemes = client.schemes().await?;
            output::print_schemes(&schemes);
        }
        Command::Submit { scheme_code, data_ref, params, task_id } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|err| anyhow::anyhow!("--params must be valid JSON: {err}"))?;
            let task_id = task_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let task_id = client.submit(&task_id, &scheme_code, &data_ref, params).await?;
            output::print_submitted(&task_id);
        }
        Command::Cancel { task_id, force } => {
            let status = client.cancel(&task_id, force).await?;
            output::print_cancel_status(&task_id, status);
        }
        Command::Watch { task_id } => {
            client.watch(&task_id, |event| output::print_progress_event(&event)).await?;
        }
        Command::Status { task_id } => {
            let task = client.get_task(&task_id).await?;
            output::print_task(&task_id, task);
        }
        Command::List => {
            let tasks = client.list_tasks().await?;
            output::print_tasks(&tasks);
        }
        Command::Health => {
            let health = client.health().await?;
            output::print_health(&health);
        }
    }

    Ok(())
}
