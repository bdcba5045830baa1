// SPDX-License-Identifier: MIT

//! The Hardware Manager: probes for a GPU at construction time and
//! exposes the two executor kinds a task can be routed to.
//!
//! GPU presence is probed by invoking `nvidia-smi -L` as a subprocess and
//! checking exit status — no vendor SDK dependency appears anywhere in the
//! retrieval pack, so this avoids fabricating one. CPU worker sizing uses
//! `std::thread::available_parallelism()`, the stable stdlib replacement
//! for a "physical cores" query (no crate in the corpus queries CPU count
//! either).

use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use algo_core::ResourceType;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Cached result of the GPU probe, reused for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GpuInfo {
    pub available: bool,
    pub summary: Option<String>,
}

impl GpuInfo {
    fn probe() -> Self {
        match Command::new("nvidia-smi").arg("-L").output() {
            Ok(output) if output.status.success() => {
                let summary = String::from_utf8_lossy(&output.stdout).trim().to_string();
                GpuInfo { available: !summary.is_empty(), summary: Some(summary).filter(|s| !s.is_empty()) }
            }
            _ => GpuInfo { available: false, summary: None },
        }
    }
}

/// Which executor a task should be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorKind {
    Cpu,
    Gpu,
}

type GpuTask = Box<dyn FnOnce() + Send>;

struct GpuJob {
    claimed: Arc<AtomicBool>,
    task: GpuTask,
}

/// A handle returned by [`GpuPool::submit`]. Pre-start cancellation is a
/// compare-and-swap race against the worker thread that will claim the
/// job: whichever side flips `claimed` from `false` to `true` first wins.
#[derive(Clone)]
pub struct GpuJobHandle {
    claimed: Arc<AtomicBool>,
}

impl GpuJobHandle {
    /// Attempt to cancel before a worker claims this job. Returns `true` if
    /// cancellation won the race (the job will never run); `false` if a
    /// worker already claimed it — it is running or has finished, and
    /// there is no way to stop a GPU job once a thread owns it.
    pub fn try_cancel(&self) -> bool {
        self.claimed.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok()
    }
}

/// A 2-worker in-process thread pool for GPU tasks: "the GPU itself
/// serializes kernels per device" is why two threads is enough concurrency
/// here rather than a larger pool.
pub struct GpuPool {
    sender: Sender<GpuJob>,
    _workers: Vec<JoinHandle<()>>,
}

impl GpuPool {
    pub fn new(worker_count: usize) -> Self {
        let (sender, receiver): (Sender<GpuJob>, Receiver<GpuJob>) = unbounded();
        let workers = (0..worker_count.max(1))
            .map(|_| {
                let receiver = receiver.clone();
                std::thread::spawn(move || {
                    for job in receiver.iter() {
                        if job.claimed.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok()
                        {
                            (job.task)();
                        }
                    }
                })
            })
            .collect();
        Self { sender, _workers: workers }
    }

    /// Enqueue a task, returning a handle that can race the worker pool for
    /// pre-start cancellation.
    pub fn submit(&self, task: impl FnOnce() + Send + 'static) -> GpuJobHandle {
        let claimed = Arc::new(AtomicBool::new(false));
        let handle = GpuJobHandle { claimed: claimed.clone() };
        // An error here means every worker thread has already exited; the
        // job simply never runs, which is indistinguishable from a
        // shutdown race and is not treated as a submission failure here —
        // the dispatcher's own timeout/health checks surface a dead pool.
        let _ = self.sender.send(GpuJob { claimed, task: Box::new(task) });
        handle
    }
}

/// Singleton: GPU probe result plus the two executor allocations.
pub struct HardwareManager {
    gpu: GpuInfo,
    cpu_workers: usize,
    gpu_pool: Option<GpuPool>,
}

impl HardwareManager {
    /// Probe hardware and allocate executors. Call once at startup; share
    /// the result via `Arc`.
    pub fn detect() -> Self {
        let gpu = GpuInfo::probe();
        let cpu_workers = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1).saturating_sub(2).max(1);
        let gpu_pool = gpu.available.then(|| GpuPool::new(2));
        Self { gpu, cpu_workers, gpu_pool }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn with_gpu(available: bool) -> Self {
        let gpu = GpuInfo { available, summary: available.then(|| "test-gpu".to_string()) };
        let gpu_pool = gpu.available.then(|| GpuPool::new(2));
        Self { gpu, cpu_workers: 1, gpu_pool }
    }

    pub fn has_gpu(&self) -> bool {
        self.gpu.available
    }

    pub fn device_info(&self) -> &GpuInfo {
        &self.gpu
    }

    /// Sizing for the CPU process pool: `max(1, physical_cores - 2)`.
    pub fn cpu_worker_count(&self) -> usize {
        self.cpu_workers
    }

    pub fn gpu_pool(&self) -> Option<&GpuPool> {
        self.gpu_pool.as_ref()
    }

    /// `executor_for(pref)`: GPU executor if `pref == GPU` and a GPU is
    /// present, else the CPU executor (falls back to CPU when no GPU).
    pub fn executor_for(&self, pref: ResourceType) -> ExecutorKind {
        if pref == ResourceType::Gpu && self.has_gpu() {
            ExecutorKind::Gpu
        } else {
            ExecutorKind::Cpu
        }
    }
}

#[cfg(test)]
#[path = "hardware_tests.rs"]
mod tests;
