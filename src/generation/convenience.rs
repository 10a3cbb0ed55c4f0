//! Convenience functions for common generation patterns.

use crate::config::StructuraConfig;
use crate::error::StructuraError;
use crate::provider;
use crate::types::*;

/// Simple text generation: config + prompt → text.
///
/// Uses the configured model and sampling defaults.
pub async fn generate(
    config: &StructuraConfig,
    prompt: impl Into<String>,
) -> Result<String, StructuraError> {
    let model = config.language_model()?;
    let provider = provider::create_provider(&model, config)?;
    let messages = vec![ModelMessage::user(prompt)];
    let result = super::text::generate_text(provider.as_ref(), messages, config.settings()).await?;
    Ok(result.text)
}

/// Analyze content: config + system prompt + content → text.
pub async fn analyze(
    config: &StructuraConfig,
    system: impl Into<String>,
    content: impl Into<String>,
) -> Result<String, StructuraError> {
    let model = config.language_model()?;
    let provider = provider::create_provider(&model, config)?;
    let messages = vec![ModelMessage::system(system), ModelMessage::user(content)];
    let result = super::text::generate_text(provider.as_ref(), messages, config.settings()).await?;
    Ok(result.text)
}
