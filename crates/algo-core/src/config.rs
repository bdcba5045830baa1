// SPDX-License-Identifier: MIT

//! Layered configuration: built-in defaults, overridden by an optional
//! TOML config file, overridden in turn by environment variables.

use std::path::{Path, PathBuf};

/// Resolved configuration for the daemon and worker binaries.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub grpc_host: String,
    pub grpc_port: u16,
    pub result_reporter_target: Option<String>,
    pub data_dir: PathBuf,
    pub result_dir: PathBuf,
    pub log_dir: PathBuf,
    pub plugin_root: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            grpc_host: "0.0.0.0".to_string(),
            grpc_port: 50051,
            result_reporter_target: None,
            data_dir: PathBuf::from("./data"),
            result_dir: PathBuf::from("./result"),
            log_dir: PathBuf::from("./logs"),
            plugin_root: PathBuf::from("./plugins"),
        }
    }
}

impl AppConfig {
    /// Build config from defaults, overridden by environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("ALGO_GRPC_HOST") {
            config.grpc_host = host;
        }
        if let Ok(port) = std::env::var("ALGO_GRPC_PORT") {
            if let Ok(port) = port.parse() {
                config.grpc_port = port;
            }
        }
        config.result_reporter_target =
            std::env::var("RESULT_REPORTER_TARGET").ok().filter(|s| !s.is_empty());
        if let Ok(dir) = std::env::var("ALGO_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("ALGO_RESULT_DIR") {
            config.result_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("ALGO_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("ALGO_PLUGIN_ROOT") {
            config.plugin_root = PathBuf::from(dir);
        }
        config
    }

    /// Build config from defaults, overlaid by `path` (if it exists and
    /// parses), overlaid in turn by environment variables. A missing config
    /// file is not an error — it just means "use the defaults" for
    /// whatever it would have supplied.
    pub fn load(path: &Path) -> Self {
        let mut config = Self::default();
        if let Ok(contents) = std::fs::read_to_string(path) {
            match toml::from_str::<ConfigFile>(&contents) {
                Ok(file) => file.apply_to(&mut config),
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "ignoring malformed config file"),
            }
        }
        Self::apply_env(&mut config);
        config
    }

    fn apply_env(config: &mut Self) {
        if let Ok(host) = std::env::var("ALGO_GRPC_HOST") {
            config.grpc_host = host;
        }
        if let Ok(port) = std::env::var("ALGO_GRPC_PORT") {
            if let Ok(port) = port.parse() {
                config.grpc_port = port;
            }
        }
        if let Ok(target) = std::env::var("RESULT_REPORTER_TARGET") {
            config.result_reporter_target = Some(target).filter(|s| !s.is_empty());
        }
        if let Ok(dir) = std::env::var("ALGO_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("ALGO_RESULT_DIR") {
            config.result_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("ALGO_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("ALGO_PLUGIN_ROOT") {
            config.plugin_root = PathBuf::from(dir);
        }
    }

    pub fn task_db_path(&self) -> PathBuf {
        self.data_dir.join("tasks.db")
    }

    pub fn result_path(&self, task_id: &str) -> PathBuf {
        self.result_dir.join(format!("{task_id}.json"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join("algo-service.log")
    }

    /// A subset of the config safe to surface through `CheckHealth`.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            grpc_host: self.grpc_host.clone(),
            grpc_port: self.grpc_port,
            remote_sink_configured: self.result_reporter_target.is_some(),
        }
    }
}

/// The on-disk shape of an optional TOML config file: every field is
/// optional so a partial file only overrides what it names, leaving the
/// rest at their built-in defaults.
#[derive(Debug, Default, serde::Deserialize)]
struct ConfigFile {
    grpc_host: Option<String>,
    grpc_port: Option<u16>,
    result_reporter_target: Option<String>,
    data_dir: Option<PathBuf>,
    result_dir: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    plugin_root: Option<PathBuf>,
}

impl ConfigFile {
    fn apply_to(self, config: &mut AppConfig) {
        if let Some(v) = self.grpc_host {
            config.grpc_host = v;
        }
        if let Some(v) = self.grpc_port {
            config.grpc_port = v;
        }
        if let Some(v) = self.result_reporter_target {
            config.result_reporter_target = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = self.data_dir {
            config.data_dir = v;
        }
        if let Some(v) = self.result_dir {
            config.result_dir = v;
        }
        if let Some(v) = self.log_dir {
            config.log_dir = v;
        }
        if let Some(v) = self.plugin_root {
            config.plugin_root = v;
        }
    }
}

/// Non-secret config surfaced over the wire for operability.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConfigSnapshot {
    pub grpc_host: String,
    pub grpc_port: u16,
    pub remote_sink_configured: bool,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
