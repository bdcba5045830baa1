// SPDX-License-Identifier: MIT

//! The data-loader boundary: `data_ref` may be a file path, a `file://`
//! URL, a `mysql[+driver]://...` URL, or a `redis://...` URL. This crate
//! never interprets a `data_ref` beyond recognizing the scheme and handing
//! off to a loader; only the file-backed loader is implemented here, since
//! SQL/KV data sources are external collaborators reachable only through
//! this same trait.

use crate::algorithm::DataValue;
use serde_json::Value as Json;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataLoaderError {
    #[error("failed to read {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("unsupported data_ref scheme: {0}")]
    UnsupportedScheme(String),
}

/// Resolves a `data_ref` into the value an algorithm operates on, plus
/// whatever metadata the loader wants to surface (row counts, schema, ...).
pub trait DataLoader: Send + Sync {
    fn load(&self, data_ref: &str) -> Result<(DataValue, Json), DataLoaderError>;
}

/// Loads `file://` URLs and bare filesystem paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl DataLoader for FileLoader {
    fn load(&self, data_ref: &str) -> Result<(DataValue, Json), DataLoaderError> {
        let path = data_ref.strip_prefix("file://").unwrap_or(data_ref);
        let bytes = std::fs::read(Path::new(path))
            .map_err(|source| DataLoaderError::Io { path: path.to_string(), source })?;
        let meta = serde_json::json!({ "path": path, "bytes": bytes.len() });
        match String::from_utf8(bytes) {
            Ok(text) => Ok((DataValue::Text(text), meta)),
            Err(e) => Ok((DataValue::Bytes(e.into_bytes()), meta)),
        }
    }
}

/// Dispatches to the right loader by URL scheme. `mysql`/`redis` schemes
/// are recognized boundary interfaces but have no loader implementation
/// here — attempting to load one reports a clear `UnsupportedScheme` error
/// instead of silently mishandling it.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlDataLoader {
    file: FileLoader,
}

impl DataLoader for UrlDataLoader {
    fn load(&self, data_ref: &str) -> Result<(DataValue, Json), DataLoaderError> {
        if data_ref.starts_with("mysql://")
            || data_ref.starts_with("mysql+")
            || data_ref.starts_with("redis://")
        {
            let scheme = data_ref.split("://").next().unwrap_or(data_ref).to_string();
            return Err(DataLoaderError::UnsupportedScheme(scheme));
        }
        self.file.load(data_ref)
    }
}

#[cfg(test)]
#[path = "dataref_tests.rs"]
mod tests;
