//! Model selector parsing.

use std::str::FromStr;

use super::{openai::OpenAiModel, LanguageModel};
use crate::error::StructuraError;

/// Parse a "provider:model" string into a LanguageModel.
pub struct ModelSelector;

impl ModelSelector {
    /// Parse "provider:model_id" into a LanguageModel.
    ///
    /// A bare model id is treated as an OpenAI model.
    /// Examples: "openai:gpt-4o", "gpt-4o-mini", "openai-compatible:llama3.1"
    pub fn parse(s: &str) -> Result<LanguageModel, StructuraError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StructuraError::InvalidArgument(
                "Invalid model selector: empty string".into(),
            ));
        }
        let Some((provider, model_id)) = s.split_once(':') else {
            return Ok(LanguageModel::OpenAi(openai_model(s)));
        };
        if model_id.is_empty() {
            return Err(StructuraError::InvalidArgument(format!(
                "Invalid model selector '{s}': missing model id"
            )));
        }

        match provider {
            "openai" => Ok(LanguageModel::OpenAi(openai_model(model_id))),
            "openai-compatible" | "openai_compatible" | "compat" => {
                Ok(LanguageModel::OpenAiCompatible {
                    model_id: model_id.to_string(),
                    base_url: None,
                })
            }
            other => Err(StructuraError::ModelNotFound(format!(
                "Unknown provider '{other}'. Use 'openai' or 'openai-compatible'."
            ))),
        }
    }
}

fn openai_model(model_id: &str) -> OpenAiModel {
    OpenAiModel::from_str(model_id).unwrap_or(OpenAiModel::Custom(model_id.to_string()))
}

impl FromStr for LanguageModel {
    type Err = StructuraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelSelector::parse(s)
    }
}
