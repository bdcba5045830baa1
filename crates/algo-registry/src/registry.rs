// SPDX-License-Identifier: MIT

//! The Algorithm Registry: a process-wide `code -> descriptor`
//! mapping populated at startup by plugin discovery.
//!
//! Discovery is explicit registration rather than scanning a plugin
//! directory at runtime: each built-in algorithm in `algo-plugins` calls
//! `Registry::register` directly from a `register(registry: &Registry)`
//! free function, and `algo_plugins::register_all` is the discovery pass,
//! run once from both `algo-daemon`'s startup and `algo-worker`'s
//! subprocess entry point (so a forked CPU worker re-registers every
//! algorithm before running one).

use algo_core::{Algorithm, AlgorithmDescriptor, AlgorithmFactory};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no algorithm registered under scheme code {0:?}")]
    UnknownScheme(String),
}

struct Entry {
    descriptor: Arc<AlgorithmDescriptor>,
    factory: AlgorithmFactory,
}

/// `code -> (descriptor, factory)`. Read-mostly after startup, so a
/// concurrent map is the right tool even though the rest of this
/// workspace defaults to `parking_lot::Mutex` for state shared with
/// writers (the status map in `algo-progress` is the contrasting case).
#[derive(Default)]
pub struct Registry {
    entries: DashMap<String, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    /// Register an algorithm under `descriptor.code`. Last-write-wins on a
    /// duplicate code — a `tracing::warn!` is emitted so the overwrite is
    /// visible instead of silent.
    pub fn register(&self, descriptor: AlgorithmDescriptor, factory: AlgorithmFactory) {
        let code = descriptor.code.clone();
        let entry = Entry { descriptor: Arc::new(descriptor), factory };
        if self.entries.insert(code.clone(), entry).is_some() {
            tracing::warn!(code = %code, "duplicate algorithm registration; replacing previous binding");
        }
    }

    pub fn get(&self, code: &str) -> Option<Arc<AlgorithmDescriptor>> {
        self.entries.get(code).map(|e| e.descriptor.clone())
    }

    /// Construct a fresh algorithm instance for `code`, if registered.
    pub fn factory(&self, code: &str) -> Option<AlgorithmFactory> {
        self.entries.get(code).map(|e| e.factory)
    }

    /// Convenience: look up and construct in one call, for the dispatcher
    /// and worker runners.
    pub fn build(&self, code: &str) -> Result<Box<dyn Algorithm>, RegistryError> {
        let factory = self.factory(code).ok_or_else(|| RegistryError::UnknownScheme(code.to_string()))?;
        Ok(factory())
    }

    pub fn list(&self) -> Vec<Arc<AlgorithmDescriptor>> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
