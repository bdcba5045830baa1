// SPDX-License-Identifier: MIT

//! Shared payload fragments for `Response`.

use algo_core::AlgorithmDescriptor;
use serde::{Deserialize, Serialize};

/// One registered scheme, as surfaced by `GetAvailableSchemes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeInfo {
    pub code: String,
    pub name: String,
    pub description: String,
    pub resource_type: algo_core::ResourceType,
    pub model: String,
}

impl From<&AlgorithmDescriptor> for SchemeInfo {
    fn from(descriptor: &AlgorithmDescriptor) -> Self {
        Self {
            code: descriptor.code.clone(),
            name: descriptor.name.clone(),
            description: descriptor.description.clone(),
            resource_type: descriptor.resource_type,
            model: descriptor.resolved_model(),
        }
    }
}

/// GPU availability as surfaced by `CheckHealth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GpuAvailability {
    Available { summary: String },
    Unavailable,
}
