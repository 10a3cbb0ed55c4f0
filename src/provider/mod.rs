//! Model invocation collaborator: the provider trait and its HTTP client.

pub mod http;
pub mod openai;

use async_trait::async_trait;

use crate::config::StructuraConfig;
use crate::error::StructuraError;
use crate::models::{LanguageModel, ModelCapabilities};
use crate::types::{FinishReason, GenerationSettings, ModelMessage, ResponseFormat, Usage};

pub use openai::OpenAiProvider;

/// A request sent to a model provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub response_format: Option<ResponseFormat>,
}

/// Response from a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by model providers.
///
/// Everything behind this seam (which host, which decoding mechanism) is
/// opaque to the rest of the crate. Callers read [`capabilities`] to decide
/// whether to request native structured output or fall back to
/// prompt-and-parse.
///
/// [`capabilities`]: ModelProvider::capabilities
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &str;
    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Capabilities of the model.
    fn capabilities(&self) -> &ModelCapabilities;

    /// Generate a single completion.
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, StructuraError>;
}

/// Create a provider for the given model, using the provided config.
///
/// The base URL comes from the model itself, then the config, then the
/// provider default.
pub fn create_provider(
    model: &LanguageModel,
    config: &StructuraConfig,
) -> Result<Box<dyn ModelProvider>, StructuraError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| StructuraError::Authentication("Missing OPENAI_API_KEY".into()))?;
    let base_url = model
        .base_url()
        .map(str::to_string)
        .or_else(|| config.base_url.clone());

    if matches!(model, LanguageModel::OpenAiCompatible { .. }) && base_url.is_none() {
        return Err(StructuraError::Configuration(format!(
            "Missing OPENAI_BASE_URL for '{model}'"
        )));
    }

    Ok(Box::new(OpenAiProvider::new(model.clone(), api_key, base_url)))
}
