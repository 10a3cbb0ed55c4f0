//! HTTP-level tests for the OpenAI chat provider against a mock server.

use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use structura::config::StructuraConfig;
use structura::error::StructuraError;
use structura::generation::{self, OutputStrategy, StructuredRequest};
use structura::models::LanguageModel;
use structura::provider::{ModelProvider, OpenAiProvider, ProviderRequest};
use structura::types::*;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19}
    })
}

fn provider(server: &MockServer) -> OpenAiProvider {
    let model: LanguageModel = "openai:gpt-4o-mini".parse().unwrap();
    OpenAiProvider::new(model, "test-key".to_string(), Some(format!("{}/", server.uri())))
}

fn request(messages: Vec<ModelMessage>) -> ProviderRequest {
    ProviderRequest {
        messages,
        settings: GenerationSettings::default(),
        response_format: None,
    }
}

#[tokio::test]
async fn chat_completion_happy_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "Be brief"},
                {"role": "user", "content": "Hi"}
            ],
            "temperature": 0.5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hello!")))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = request(vec![ModelMessage::system("Be brief"), ModelMessage::user("Hi")]);
    req.settings.temperature = Some(0.5);

    let response = provider(&server)
        .generate_text(&req)
        .await
        .expect("completion should succeed");

    assert_eq!(response.text, "Hello!");
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    assert_eq!(
        response.usage,
        Usage {
            input_tokens: 12,
            output_tokens: 7,
            total_tokens: 19
        }
    );
}

#[tokio::test]
async fn json_schema_format_is_sent_strict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "response_format": {
                "type": "json_schema",
                "json_schema": {"name": "City", "strict": true}
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion(r#"{"city": "Paris"}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    #[derive(Debug, Deserialize)]
    struct City {
        city: String,
    }

    let result = generation::generate_object::<City>(
        &provider(&server),
        vec![ModelMessage::user("Capital of France?")],
        GenerationSettings::default(),
        StructuredRequest::new(
            "City",
            json!({"type": "object", "properties": {"city": {"type": "string"}}}),
        )
        .with_strategy(OutputStrategy::JsonSchema),
    )
    .await
    .unwrap();

    assert_eq!(result.object.city, "Paris");
}

#[tokio::test]
async fn prompt_and_parse_round_trip_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "Sure.\n```json\n{\"city\": \"Rome\"}\n```\nAnything else?",
        )))
        .mount(&server)
        .await;

    let result = generation::generate_object::<serde_json::Value>(
        &provider(&server),
        vec![ModelMessage::user("Capital of Italy?")],
        GenerationSettings::default(),
        StructuredRequest::new("City", json!({"type": "object"})),
    )
    .await
    .unwrap();

    assert_eq!(result.object, json!({"city": "Rome"}));
    assert_eq!(result.usage.total_tokens, 19);
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "Incorrect API key provided"}})),
        )
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate_text(&request(vec![ModelMessage::user("Hi")]))
        .await
        .unwrap_err();

    assert!(
        matches!(&err, StructuraError::Authentication(m) if m == "Incorrect API key provided"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({"error": {"message": "slow down", "retry_after": 1.5}})),
        )
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate_text(&request(vec![ModelMessage::user("Hi")]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StructuraError::RateLimited {
            retry_after_ms: Some(1500)
        }
    ));
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate_text(&request(vec![ModelMessage::user("Hi")]))
        .await
        .unwrap_err();

    match err {
        StructuraError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate_text(&request(vec![ModelMessage::user("Hi")]))
        .await
        .unwrap_err();

    assert!(matches!(err, StructuraError::Api { status: 200, .. }));
}

#[tokio::test]
async fn convenience_generate_uses_config_base_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer cfg-key"))
        .and(body_partial_json(json!({"model": "local-llama", "max_tokens": 64})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("pong")))
        .expect(1)
        .mount(&server)
        .await;

    let config = StructuraConfig::new()
        .with_api_key("cfg-key")
        .with_base_url(server.uri())
        .with_model("openai-compatible:local-llama")
        .with_max_tokens(64);

    let text = generation::generate(&config, "ping").await.unwrap();
    assert_eq!(text, "pong");
}
