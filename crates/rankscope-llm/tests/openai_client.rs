//! Integration tests for `OpenAiClient` and the call sites using wiremock.

use rankscope_core::{AnalysisScope, ConversionRateSource};
use rankscope_llm::{
    filter_relevant_keywords, passthrough_filter, resolve_conversion_rate, CompletionRequest,
    LlmError, OpenAiClient, RelevanceContext, RelevanceFilterError, TextCompletion,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> OpenAiClient {
    OpenAiClient::with_base_url("sk-test", 30, base_url).expect("client construction should not fail")
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ]
    })
}

fn request(json_mode: bool) -> CompletionRequest {
    CompletionRequest {
        model: "gpt-4o".to_string(),
        system: "system".to_string(),
        user: "user".to_string(),
        temperature: 0.4,
        max_tokens: None,
        json_mode,
    }
}

fn context() -> RelevanceContext<'static> {
    RelevanceContext {
        business_type: "roofing",
        domain: "acmeroofing.com",
        business_name: "acmeroofing",
        scope: AnalysisScope::Local,
        location: "Austin, Texas",
    }
}

#[test]
fn blank_api_key_is_rejected() {
    assert!(matches!(
        OpenAiClient::with_base_url(" ", 30, "http://localhost"),
        Err(LlmError::MissingApiKey)
    ));
}

#[tokio::test]
async fn complete_sends_bearer_auth_and_json_mode() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("  {\"keywords\": []}  ")))
        .expect(1)
        .mount(&server)
        .await;

    let text = test_client(&server.uri()).complete(&request(true)).await.unwrap();
    assert_eq!(text, "{\"keywords\": []}");
}

#[tokio::test]
async fn non_2xx_is_a_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit reached"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).complete(&request(false)).await.unwrap_err();
    assert!(matches!(err, LlmError::Status { status: 429, .. }));
}

#[tokio::test]
async fn empty_choices_is_an_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri()).complete(&request(false)).await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
}

#[tokio::test]
async fn relevance_filter_keeps_model_selection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"keywords": ["roof repair austin", "metal roofing"]}"#,
        )))
        .mount(&server)
        .await;

    let input: Vec<String> = ["roof repair austin", "roofing jobs austin", "metal roofing"]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    let client = test_client(&server.uri());
    let kept = filter_relevant_keywords(&client, "gpt-4o", &input, &context())
        .await
        .unwrap();
    assert_eq!(kept, vec!["roof repair austin", "metal roofing"]);
}

#[tokio::test]
async fn relevance_filter_malformed_answer_recovers_with_passthrough() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Sure! Here are the keywords")))
        .mount(&server)
        .await;

    let input = vec!["roof repair".to_string(), "gutter cleaning".to_string()];
    let client = test_client(&server.uri());
    let result = filter_relevant_keywords(&client, "gpt-4o", &input, &context()).await;

    let kept = match result {
        Err(RelevanceFilterError::Malformed(_)) => passthrough_filter(&input),
        other => panic!("expected malformed error, got {other:?}"),
    };
    assert_eq!(kept, input);
}

#[tokio::test]
async fn conversion_estimate_from_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({ "model": "gpt-4o-mini", "max_tokens": 5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("6.5")))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let estimate = resolve_conversion_rate(&client, "gpt-4o-mini", "plumbing", AnalysisScope::Local).await;
    assert_eq!(estimate.source, ConversionRateSource::AiEstimate);
    assert!((estimate.rate - 6.5).abs() < 1e-9);
}
