//! Plain text generation.

use tracing::debug;

use crate::error::StructuraError;
use crate::provider::{ModelProvider, ProviderRequest};
use crate::types::*;

/// Send `messages` to the provider once and return its text.
///
/// The response format in `settings` (if any) is forwarded as-is.
pub async fn generate_text(
    provider: &dyn ModelProvider,
    messages: Vec<ModelMessage>,
    settings: GenerationSettings,
) -> Result<GenerateTextResult, StructuraError> {
    let request = ProviderRequest {
        messages,
        response_format: settings.response_format.clone(),
        settings,
    };

    debug!(
        provider = provider.provider_name(),
        model = provider.model_id(),
        "generate_text: calling provider"
    );
    let response = provider.generate_text(&request).await?;

    Ok(GenerateTextResult {
        text: response.text,
        usage: response.usage,
        finish_reason: response.finish_reason,
    })
}
