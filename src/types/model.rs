//! Model catalog descriptors.

use serde::{Deserialize, Serialize};

/// A model offered by a backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default)]
    pub capabilities: ModelCapabilities,
}

impl Model {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            owner: None,
            capabilities: ModelCapabilities::default(),
        }
    }
}

/// Describes what a model can do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelCapabilities {
    pub supports_vision: bool,
    pub supports_tools: bool,
    pub supports_streaming: bool,
    pub supports_audio: bool,
    pub context_length: usize,
    pub max_output_tokens: Option<usize>,
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self {
            supports_vision: false,
            supports_tools: false,
            supports_streaming: true,
            supports_audio: false,
            context_length: 4096,
            max_output_tokens: None,
        }
    }
}

impl ModelCapabilities {
    /// Full-featured model capabilities.
    pub fn full(context_length: usize) -> Self {
        Self {
            supports_vision: true,
            supports_tools: true,
            supports_streaming: true,
            supports_audio: true,
            context_length,
            max_output_tokens: None,
        }
    }
}
