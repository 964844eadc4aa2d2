//! AI gateway behaviour against scripted providers

mod helpers;

use helpers::*;
use leasescout_ai::error::AnalysisError;
use leasescout_ai::services::ai_gateway::{CallOptions, Provider};
use serde_json::json;

#[tokio::test]
async fn test_gemini_truncation_retries_on_fallback() {
    let mock = MockTransport::new();
    mock.push(Provider::Gemini, gemini_truncated("{\"partial\": "));
    mock.push(Provider::Gemini, gemini_reply("{\"ok\": true}"));
    let gateway = gateway(&mock);

    let text = gateway
        .call_gemini("prompt", CallOptions::new().model("gemini-2.5-flash"))
        .await
        .unwrap();

    assert_eq!(text, "{\"ok\": true}");
    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].model, "gemini-2.5-flash");
    assert_eq!(calls[1].model, Provider::Gemini.fallback_model());
}

#[tokio::test]
async fn test_truncation_on_fallback_is_empty_response() {
    let mock = MockTransport::new();
    mock.push(Provider::Gemini, gemini_truncated("cut"));
    let gateway = gateway(&mock);

    let result = gateway
        .call_gemini("prompt", CallOptions::new().model(Provider::Gemini.fallback_model()))
        .await;

    assert!(matches!(
        result,
        Err(AnalysisError::EmptyResponse {
            provider: Provider::Gemini
        })
    ));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_double_truncation_stops_after_one_retry() {
    let mock = MockTransport::new();
    mock.push(Provider::OpenAi, openai_truncated("a"));
    mock.push(Provider::OpenAi, openai_truncated("b"));
    mock.push(Provider::OpenAi, openai_reply("never reached"));
    let gateway = gateway(&mock);

    let result = gateway.call_openai("prompt", CallOptions::new()).await;

    assert!(matches!(result, Err(AnalysisError::EmptyResponse { .. })));
    assert_eq!(mock.call_count(), 2);
    assert_eq!(mock.calls()[1].model, "gpt-4o-mini");
}

#[tokio::test]
async fn test_transport_errors_are_not_retried() {
    let mock = MockTransport::new();
    mock.push_error(Provider::Claude, "overloaded");
    let gateway = gateway(&mock);

    let result = gateway.call_claude("prompt", CallOptions::new()).await;

    assert!(matches!(result, Err(AnalysisError::Upstream { .. })));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn test_blank_completion_is_empty_response() {
    let mock = MockTransport::new();
    mock.push(Provider::OpenAi, openai_reply("   "));
    let gateway = gateway(&mock);

    let result = gateway.call_openai("prompt", CallOptions::new()).await;
    assert!(matches!(result, Err(AnalysisError::EmptyResponse { .. })));
}

#[tokio::test]
async fn test_claude_text_blocks_joined_and_tool_sent() {
    let mock = MockTransport::new();
    mock.push(Provider::Claude, claude_reply("<json>{}</json>"));
    let gateway = gateway(&mock);

    let text = gateway
        .call_claude("research this", CallOptions::new().web_search())
        .await
        .unwrap();

    assert_eq!(text, "<json>{}</json>");
    let body = &mock.calls()[0].body;
    assert_eq!(body["tools"][0]["name"], "web_search");
}

#[tokio::test]
async fn test_forward_lifts_gemini_model_out_of_body() {
    let mock = MockTransport::new();
    mock.push(Provider::Gemini, json!({ "candidates": [] }));
    let gateway = gateway(&mock);

    let reply = gateway
        .forward(
            Provider::Gemini,
            json!({ "model": "gemini-1.5-pro", "contents": [{ "parts": [{ "text": "hi" }] }] }),
        )
        .await
        .unwrap();

    assert_eq!(reply, json!({ "candidates": [] }));
    let call = &mock.calls()[0];
    assert_eq!(call.model, "gemini-1.5-pro");
    assert!(call.body.get("model").is_none());
    assert!(call.body.get("contents").is_some());
}
