// SPDX-License-Identifier: MIT

//! Algorithm descriptor — the immutable, in-memory record of a registered
//! scheme.

use crate::status::ResourceType;
use serde::{Deserialize, Serialize};

/// Immutable metadata for one registered algorithm.
///
/// Registered once at startup (or subprocess re-registration) and never
/// mutated afterward; see `algo-registry` for the map this lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmDescriptor {
    pub code: String,
    pub name: String,
    pub description: String,
    pub resource_type: ResourceType,
    pub model: Option<String>,
    /// Originating module, e.g. `module_path!()` with `::` replaced by `-`.
    pub source: String,
}

impl AlgorithmDescriptor {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        resource_type: ResourceType,
        source: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: String::new(),
            resource_type,
            model: None,
            source: source.into(),
        }
    }

    crate::setters! {
        into {
            description: String,
        }
        option {
            model: String,
        }
    }

    /// Resolve the `model` the way discovery does: the declared value, or
    /// the source path with `::` replaced by `-`.
    pub fn resolved_model(&self) -> String {
        self.model.clone().unwrap_or_else(|| self.source.replace("::", "-"))
    }
}
