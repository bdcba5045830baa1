// SPDX-License-Identifier: MIT

//! Plain-text formatting for every command's reply. No color/table crate
//! is pulled in for this — the teacher's own CLI formats by hand too, and
//! the surface here is small enough not to need one.

use algo_core::{ProgressEvent, TaskRecord};
use algo_wire::{CancelStatus, Response, SchemeInfo};

pub fn print_schemes(schemes: &[SchemeInfo]) {
    if schemes.is_empty() {
        println!("no algorithms registered");
        return;
    }
    for scheme in schemes {
        println!("{:<12} {:<6} {:<24} {}", scheme.code, format!("{:?}", scheme.resource_type).to_uppercase(), scheme.model, scheme.name);
    }
}

pub fn print_submitted(task_id: &str) {
    println!("submitted {task_id}");
}

pub fn print_cancel_status(task_id: &str, status: CancelStatus) {
    let label = match status {
        CancelStatus::Cancelled => "cancelled",
        CancelStatus::Terminating => "terminating (SIGTERM sent, escalating if it ignores it)",
        CancelStatus::CancelRequested => "cancel requested (cooperative)",
        CancelStatus::AlreadyTerminal => "already in a terminal state",
        CancelStatus::NotFound => "no such task",
    };
    println!("{task_id}: {label}");
}

pub fn print_progress_event(event: &ProgressEvent) {
    println!("{:>3}% {}", event.percentage, event.message);
}

pub fn print_task(task_id: &str, task: Option<TaskRecord>) {
    match task {
        Some(record) => println!(
            "{:<36} {:<16} {:>3}% {}",
            record.task_id, record.status, record.percentage, record.message
        ),
        None => println!("{task_id}: no such task"),
    }
}

pub fn print_tasks(tasks: &[TaskRecord]) {
    if tasks.is_empty() {
        println!("no tasks");
        return;
    }
    for record in tasks {
        println!("{:<36} {:<16} {:>3}% {}", record.task_id, record.status, record.percentage, record.message);
    }
}

pub fn print_health(response: &Response) {
    let Response::Health { status, gpu, config, metrics } = response else {
        println!("unexpected health response");
        return;
    };
    println!("status:      {status:?}");
    println!("gpu:         {gpu:?}");
    println!("listening:   {}:{}", config.grpc_host, config.grpc_port);
    println!("remote sink: {}", if config.remote_sink_configured { "configured" } else { "not configured" });
    println!(
        "tasks:       submitted={} succeeded={} failed={} cancelled={}",
        metrics.submitted, metrics.succeeded, metrics.failed, metrics.cancelled
    );
}
