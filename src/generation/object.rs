//! Structured output: generate typed objects from model responses.

use serde::de::DeserializeOwned;
use strum::{Display, EnumString};
use tracing::debug;

use crate::error::StructuraError;
use crate::extract::{extract_as, parse_payload};
use crate::models::ModelCapabilities;
use crate::provider::ModelProvider;
use crate::types::*;

/// How to get JSON out of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputStrategy {
    /// Provider-side schema-constrained decoding.
    JsonSchema,
    /// Provider guarantees syntactically valid JSON; the schema goes in the prompt.
    JsonMode,
    /// Ask for a fenced `json` block and run the response through the extractor.
    PromptAndParse,
}

impl OutputStrategy {
    /// The strongest mechanism the model advertises.
    pub fn for_capabilities(capabilities: &ModelCapabilities) -> Self {
        if capabilities.supports_json_schema {
            Self::JsonSchema
        } else if capabilities.supports_json_mode {
            Self::JsonMode
        } else {
            Self::PromptAndParse
        }
    }
}

/// What to generate: an opaque schema descriptor, its name, and how to ask for it.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub name: String,
    pub schema: serde_json::Value,
    pub strategy: OutputStrategy,
}

impl StructuredRequest {
    /// A prompt-and-parse request, which works with any chat model.
    pub fn new(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            schema,
            strategy: OutputStrategy::PromptAndParse,
        }
    }

    pub fn with_strategy(mut self, strategy: OutputStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Pick the strategy from the provider's advertised capabilities.
    pub fn for_provider(self, provider: &dyn ModelProvider) -> Self {
        let strategy = OutputStrategy::for_capabilities(provider.capabilities());
        self.with_strategy(strategy)
    }
}

/// Generate a typed object.
///
/// The request's strategy decides the mechanism; this function does not
/// second-guess it. Whatever comes back is decoded with
/// [`parse_payload`], so a fenced answer is accepted under every strategy.
pub async fn generate_object<T: DeserializeOwned>(
    provider: &dyn ModelProvider,
    mut messages: Vec<ModelMessage>,
    mut settings: GenerationSettings,
    request: StructuredRequest,
) -> Result<GenerateObjectResult<T>, StructuraError> {
    let StructuredRequest {
        name,
        schema,
        strategy,
    } = request;
    let schema_text = serde_json::to_string_pretty(&schema)?;
    debug!(type_name = %name, strategy = %strategy, "generate_object");

    match strategy {
        OutputStrategy::JsonSchema => {
            settings.response_format = Some(ResponseFormat::JsonSchema { schema, name });
        }
        OutputStrategy::JsonMode => {
            settings.response_format = Some(ResponseFormat::JsonObject);
            let instruction = format!(
                "You must respond with valid JSON matching this schema:\n```json\n{schema_text}\n```"
            );
            insert_instruction(provider, &mut messages, instruction);
        }
        OutputStrategy::PromptAndParse => {
            settings.response_format = None;
            let instruction = format!(
                "Respond with a single ```json fenced code block containing a `{name}` object that matches this schema, and nothing else:\n```json\n{schema_text}\n```"
            );
            insert_instruction(provider, &mut messages, instruction);
        }
    }

    let result = super::text::generate_text(provider, messages, settings).await?;
    let object: T = parse_payload(&result.text)?;

    Ok(GenerateObjectResult {
        object,
        raw_text: result.text,
        usage: result.usage,
        finish_reason: result.finish_reason,
    })
}

/// Generate any number of typed objects via prompt-and-parse.
///
/// The model is asked for one fenced `json` block per item; every block is
/// decoded into `T`, in order. No blocks yields an empty vector. One bad block
/// fails the whole call with `MalformedPayload`.
pub async fn generate_objects<T: DeserializeOwned>(
    provider: &dyn ModelProvider,
    mut messages: Vec<ModelMessage>,
    mut settings: GenerationSettings,
    schema: serde_json::Value,
    type_name: &str,
) -> Result<GenerateObjectResult<Vec<T>>, StructuraError> {
    let schema_text = serde_json::to_string_pretty(&schema)?;
    let instruction = format!(
        "For each `{type_name}` in your answer, emit a separate ```json fenced code block matching this schema:\n```json\n{schema_text}\n```"
    );
    insert_instruction(provider, &mut messages, instruction);
    settings.response_format = None;

    debug!(type_name, "generate_objects");
    let result = super::text::generate_text(provider, messages, settings).await?;
    let objects: Vec<T> = extract_as(&result.text)?;

    Ok(GenerateObjectResult {
        object: objects,
        raw_text: result.text,
        usage: result.usage,
        finish_reason: result.finish_reason,
    })
}

/// Put the format instruction first, as a system message when the model takes one.
fn insert_instruction(
    provider: &dyn ModelProvider,
    messages: &mut Vec<ModelMessage>,
    instruction: String,
) {
    let message = if provider.capabilities().supports_system_messages {
        ModelMessage::system(instruction)
    } else {
        ModelMessage::user(instruction)
    };
    messages.insert(0, message);
}
