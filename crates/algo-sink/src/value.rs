// SPDX-License-Identifier: MIT

//! `SinkValue`: the typed stand-in for the original's dynamically-typed
//! "anything an algorithm can return" result value.
//!
//! The original spec's best-effort fallback serializer degrades whatever
//! an algorithm produces into something JSON-safe: tabular frames become a
//! list of records, time points become ISO-8601 strings, numeric arrays
//! become plain lists, and anything else becomes a string. A closed enum
//! is the typed-language equivalent of that dynamic degradation — every
//! variant already knows how it serializes.

use chrono::{TimeZone, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value as Json;

/// The result payload an algorithm hands back, or the sink degrades a
/// structured `Json` value it was given directly.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkValue {
    /// Already JSON-shaped data — the common case, taken verbatim from
    /// `Algorithm::execute`'s return value.
    Json(Json),
    /// A tabular frame, degraded to a list of row objects.
    Records(Vec<Json>),
    /// A point in time, degraded to an ISO-8601 string.
    TimePoint(i64),
    /// A numeric array, degraded to a plain JSON number list.
    Numbers(Vec<f64>),
    /// Anything else, degraded to its string representation.
    Text(String),
}

impl SinkValue {
    /// Apply the degradation and produce the JSON value that is actually
    /// written to the local artifact and the wire message.
    pub fn to_json(&self) -> Json {
        match self {
            SinkValue::Json(value) => value.clone(),
            SinkValue::Records(rows) => Json::Array(rows.clone()),
            SinkValue::TimePoint(epoch_ms) => {
                let text = Utc
                    .timestamp_millis_opt(*epoch_ms)
                    .single()
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_else(|| epoch_ms.to_string());
                Json::String(text)
            }
            SinkValue::Numbers(values) => {
                Json::Array(values.iter().map(|n| serde_json::json!(n)).collect())
            }
            SinkValue::Text(text) => Json::String(text.clone()),
        }
    }
}

impl From<Json> for SinkValue {
    fn from(value: Json) -> Self {
        SinkValue::Json(value)
    }
}

impl Serialize for SinkValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
