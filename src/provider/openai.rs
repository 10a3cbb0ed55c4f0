//! OpenAI Chat Completions API provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::StructuraError;
use crate::models::{LanguageModel, ModelCapabilities};
use crate::types::*;

use super::http::{bearer_headers, shared_client, status_to_error};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for `/chat/completions` on OpenAI or any compatible server.
pub struct OpenAiProvider {
    model: LanguageModel,
    api_key: String,
    base_url: String,
    capabilities: ModelCapabilities,
}

impl OpenAiProvider {
    pub fn new(model: LanguageModel, api_key: String, base_url: Option<String>) -> Self {
        let capabilities = model.capabilities();
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            model,
            api_key,
            base_url,
            capabilities,
        }
    }

    /// Override the advertised capabilities (e.g. for a server known to honour schemas).
    pub fn with_capabilities(mut self, capabilities: ModelCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let messages = request
            .messages
            .iter()
            .map(message_to_openai)
            .collect::<Vec<_>>();

        let mut body = serde_json::Map::new();
        body.insert("model".into(), self.model.model_id().into());
        body.insert("messages".into(), messages.into());

        let settings = &request.settings;
        if let Some(max) = settings.max_tokens {
            body.insert("max_tokens".into(), max.into());
        }
        if let Some(temp) = settings.temperature {
            body.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = settings.top_p {
            body.insert("top_p".into(), top_p.into());
        }
        if let Some(ref stops) = settings.stop_sequences {
            body.insert("stop".into(), serde_json::json!(stops));
        }
        if let Some(pp) = settings.presence_penalty {
            body.insert("presence_penalty".into(), pp.into());
        }
        if let Some(fp) = settings.frequency_penalty {
            body.insert("frequency_penalty".into(), fp.into());
        }
        if let Some(seed) = settings.seed {
            body.insert("seed".into(), seed.into());
        }
        if let Some(ref user) = settings.user {
            body.insert("user".into(), user.clone().into());
        }

        // An explicit request format wins over one carried in the settings.
        let format = request
            .response_format
            .as_ref()
            .or(settings.response_format.as_ref());
        match format {
            Some(ResponseFormat::JsonObject) => {
                body.insert(
                    "response_format".into(),
                    serde_json::json!({"type": "json_object"}),
                );
            }
            Some(ResponseFormat::JsonSchema { schema, name }) => {
                body.insert(
                    "response_format".into(),
                    serde_json::json!({
                        "type": "json_schema",
                        "json_schema": {
                            "name": name,
                            "schema": schema,
                            "strict": true,
                        }
                    }),
                );
            }
            Some(ResponseFormat::Text) | None => {}
        }

        serde_json::Value::Object(body)
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        self.model.provider_name()
    }

    fn model_id(&self) -> &str {
        self.model.model_id()
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, StructuraError> {
        let body = self.build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            model = self.model.model_id(),
            messages = request.messages.len(),
            "OpenAI generate_text"
        );

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: OpenAiChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| StructuraError::api(200, "No choices in OpenAI response"))?;

        let finish_reason = choice
            .finish_reason
            .as_deref()
            .and_then(parse_finish_reason);

        Ok(ProviderResponse {
            text: choice.message.content.unwrap_or_default(),
            usage: data
                .usage
                .map(|u| Usage {
                    input_tokens: u.prompt_tokens,
                    output_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                })
                .unwrap_or_default(),
            finish_reason,
        })
    }
}

fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" | "function_call" => Some(FinishReason::ToolCalls),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

fn message_to_openai(msg: &ModelMessage) -> serde_json::Value {
    let mut value = serde_json::json!({
        "role": msg.role.to_string(),
        "content": msg.content,
    });
    if let (Some(name), Some(obj)) = (&msg.name, value.as_object_mut()) {
        obj.insert("name".into(), name.clone().into());
    }
    value
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
