//! Generation settings, response formats, and results.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::Usage;

/// Settings controlling text generation.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Default, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub stop_sequences: Option<Vec<String>>,
    pub presence_penalty: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub seed: Option<u64>,
    pub user: Option<String>,
    pub response_format: Option<ResponseFormat>,
}

/// Requested response format.
///
/// The schema in `JsonSchema` is an opaque descriptor handed to the provider;
/// nothing in this crate validates against it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
    JsonSchema {
        schema: serde_json::Value,
        name: String,
    },
}

/// Why generation finished.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Error,
}

/// Result of a plain text generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateTextResult {
    pub text: String,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Result of a structured generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateObjectResult<T> {
    pub object: T,
    /// The response text exactly as the model returned it.
    pub raw_text: String,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}
