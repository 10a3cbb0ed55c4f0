//! Model identifiers and capabilities.

pub mod capabilities;
pub mod openai;
pub mod selector;

pub use capabilities::ModelCapabilities;
pub use openai::OpenAiModel;
pub use selector::ModelSelector;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A model served over the OpenAI Chat Completions wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "provider", content = "model")]
pub enum LanguageModel {
    /// A model on the hosted OpenAI API.
    OpenAi(OpenAiModel),
    /// Any server speaking the same protocol (vLLM, LM Studio, a proxy, ...).
    OpenAiCompatible {
        model_id: String,
        base_url: Option<String>,
    },
}

impl LanguageModel {
    /// Get the model's API identifier string.
    pub fn model_id(&self) -> &str {
        match self {
            Self::OpenAi(m) => m.as_str(),
            Self::OpenAiCompatible { model_id, .. } => model_id,
        }
    }

    /// Get the provider name.
    pub fn provider_name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai",
            Self::OpenAiCompatible { .. } => "openai-compatible",
        }
    }

    /// Base URL pinned on the model itself, if any.
    pub fn base_url(&self) -> Option<&str> {
        match self {
            Self::OpenAi(_) => None,
            Self::OpenAiCompatible { base_url, .. } => base_url.as_deref(),
        }
    }

    /// Get capabilities for this model.
    ///
    /// Compatible servers are assumed to honour JSON mode but not JSON schema.
    pub fn capabilities(&self) -> ModelCapabilities {
        match self {
            Self::OpenAi(m) => m.capabilities(),
            Self::OpenAiCompatible { .. } => ModelCapabilities {
                supports_json_mode: true,
                ..ModelCapabilities::default()
            },
        }
    }
}

impl fmt::Display for LanguageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider_name(), self.model_id())
    }
}
