//! Model capabilities descriptor.

use serde::{Deserialize, Serialize};

/// Describes which structured-output mechanisms a model supports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelCapabilities {
    pub supports_json_mode: bool,
    pub supports_json_schema: bool,
    pub supports_system_messages: bool,
    pub context_length: usize,
    pub max_output_tokens: Option<usize>,
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self {
            supports_json_mode: false,
            supports_json_schema: false,
            supports_system_messages: true,
            context_length: 4096,
            max_output_tokens: None,
        }
    }
}

impl ModelCapabilities {
    /// Full-featured model capabilities.
    pub fn full(context_length: usize) -> Self {
        Self {
            supports_json_mode: true,
            supports_json_schema: true,
            supports_system_messages: true,
            context_length,
            max_output_tokens: None,
        }
    }

    /// A plain chat model: no JSON mode, no schema support.
    pub fn text_only(context_length: usize) -> Self {
        Self {
            context_length,
            ..Self::default()
        }
    }
}
