//! AI provider gateway
//!
//! One call contract per provider (`call_openai`, `call_gemini`,
//! `call_claude`) returning the text of the top completion. Request and
//! response shapes are translated here; the wire is behind
//! [`ProviderTransport`] so tests can script provider replies.
//!
//! The only retry is the truncation downgrade: a completion cut off by the
//! token limit on a non-fallback model is re-issued once on the provider's
//! fallback model. Transport failures are never retried.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::AnalysisError;

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const CLAUDE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const USER_AGENT: &str = concat!("leasescout-ai/", env!("CARGO_PKG_VERSION"));

/// Timeout applied to every outbound AI request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// System role sent to OpenAI and Claude
pub const SYSTEM_PROMPT: &str = "You are an expert industrial real estate analyst with deep \
    knowledge of tenant requirements, market trends, and property valuation.";

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
    Claude,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o",
            Provider::Gemini => "gemini-2.5-flash",
            Provider::Claude => "claude-sonnet-4-20250514",
        }
    }

    /// Smaller model used for the single truncation retry
    pub fn fallback_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Gemini => "gemini-2.0-flash",
            Provider::Claude => "claude-3-5-haiku-20241022",
        }
    }

    pub fn default_max_tokens(&self) -> u32 {
        match self {
            Provider::OpenAi => 1500,
            Provider::Gemini => 1000,
            Provider::Claude => 2000,
        }
    }

    /// Environment variable holding the API key
    pub fn key_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::Claude => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Gemini",
            Provider::Claude => "Claude",
        })
    }
}

/// Per-call options; unset fields take the provider defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    /// `max_tokens` for OpenAI/Claude, `maxOutputTokens` for Gemini
    pub max_tokens: Option<u32>,
    /// Claude web search tool
    pub web_search: bool,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn web_search(mut self) -> Self {
        self.web_search = true;
        self
    }
}

/// OpenAI o-series models reject `temperature` and `max_tokens`
fn is_reasoning_model(model: &str) -> bool {
    let model = model.to_ascii_lowercase();
    ["o1", "o3", "o4"]
        .iter()
        .any(|family| model == *family || model.starts_with(&format!("{}-", family)))
}

/// Provider-native request body
pub fn build_request(provider: Provider, model: &str, prompt: &str, options: &CallOptions) -> Value {
    let max_tokens = options
        .max_tokens
        .unwrap_or_else(|| provider.default_max_tokens());
    let temperature = options.temperature.unwrap_or(DEFAULT_TEMPERATURE);

    match provider {
        Provider::OpenAi => {
            let messages = json!([
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ]);
            if is_reasoning_model(model) {
                json!({
                    "model": model,
                    "messages": messages,
                    "max_completion_tokens": max_tokens,
                })
            } else {
                json!({
                    "model": model,
                    "messages": messages,
                    "max_tokens": max_tokens,
                    "temperature": temperature,
                })
            }
        }
        // Model goes in the URL, not the body
        Provider::Gemini => json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "maxOutputTokens": max_tokens,
                "temperature": temperature,
            },
        }),
        Provider::Claude => {
            let mut body = json!({
                "model": model,
                "max_tokens": max_tokens,
                "temperature": temperature,
                "system": SYSTEM_PROMPT,
                "messages": [{ "role": "user", "content": prompt }],
            });
            if options.web_search {
                body["tools"] = json!([{
                    "type": "web_search_20250305",
                    "name": "web_search",
                    "max_uses": 5,
                }]);
            }
            body
        }
    }
}

/// Common view over provider completion envelopes
pub trait CompletionEnvelope {
    /// Text of the top completion, if any non-blank text was returned
    fn text(&self) -> Option<String>;

    /// Provider reports the completion was cut off by the token limit
    fn is_truncated(&self) -> bool;
}

fn non_blank(text: String) -> Option<String> {
    (!text.trim().is_empty()).then_some(text)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiResponse {
    #[serde(default)]
    pub choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiChoice {
    #[serde(default)]
    pub message: Option<OpenAiMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAiMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionEnvelope for OpenAiResponse {
    fn text(&self) -> Option<String> {
        self.choices
            .first()?
            .message
            .as_ref()?
            .content
            .clone()
            .and_then(non_blank)
    }

    fn is_truncated(&self) -> bool {
        self.choices
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            == Some("length")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeminiContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: Option<String>,
}

impl CompletionEnvelope for GeminiResponse {
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        non_blank(text)
    }

    fn is_truncated(&self) -> bool {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            == Some("MAX_TOKENS")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaudeResponse {
    #[serde(default)]
    pub content: Vec<ClaudeBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaudeBlock {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl CompletionEnvelope for ClaudeResponse {
    /// Text blocks are concatenated; tool-use blocks are skipped
    fn text(&self) -> Option<String> {
        let text: String = self
            .content
            .iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text.as_deref())
            .collect();
        non_blank(text)
    }

    fn is_truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }
}

/// Decoded completion, one variant per provider
#[derive(Debug, Clone)]
pub enum ProviderResponse {
    OpenAi(OpenAiResponse),
    Gemini(GeminiResponse),
    Claude(ClaudeResponse),
}

impl ProviderResponse {
    pub fn from_json(provider: Provider, payload: Value) -> Result<Self, serde_json::Error> {
        Ok(match provider {
            Provider::OpenAi => ProviderResponse::OpenAi(serde_json::from_value(payload)?),
            Provider::Gemini => ProviderResponse::Gemini(serde_json::from_value(payload)?),
            Provider::Claude => ProviderResponse::Claude(serde_json::from_value(payload)?),
        })
    }
}

impl CompletionEnvelope for ProviderResponse {
    fn text(&self) -> Option<String> {
        match self {
            ProviderResponse::OpenAi(r) => r.text(),
            ProviderResponse::Gemini(r) => r.text(),
            ProviderResponse::Claude(r) => r.text(),
        }
    }

    fn is_truncated(&self) -> bool {
        match self {
            ProviderResponse::OpenAi(r) => r.is_truncated(),
            ProviderResponse::Gemini(r) => r.is_truncated(),
            ProviderResponse::Claude(r) => r.is_truncated(),
        }
    }
}

/// Sends a provider-native body and returns the provider-native reply
///
/// Implementations return `AnalysisError::Upstream` for transport failures
/// and non-2xx statuses, carrying the reply body when there is one.
#[async_trait]
pub trait ProviderTransport: Send + Sync {
    async fn send(&self, provider: Provider, model: &str, body: Value) -> Result<Value, AnalysisError>;
}

/// API keys for the HTTP transport
#[derive(Debug, Clone, Default)]
pub struct ProviderKeys {
    pub openai: Option<String>,
    pub gemini: Option<String>,
    pub claude: Option<String>,
}

impl ProviderKeys {
    fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai.as_deref(),
            Provider::Gemini => self.gemini.as_deref(),
            Provider::Claude => self.claude.as_deref(),
        }
    }
}

/// reqwest-backed transport
pub struct HttpTransport {
    http: reqwest::Client,
    keys: ProviderKeys,
}

impl HttpTransport {
    pub fn new(keys: ProviderKeys) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AnalysisError::Internal(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self { http, keys })
    }
}

fn upstream(provider: Provider, status: Option<u16>, message: String, payload: Option<Value>) -> AnalysisError {
    AnalysisError::Upstream {
        provider,
        status,
        message,
        payload,
    }
}

#[async_trait]
impl ProviderTransport for HttpTransport {
    async fn send(&self, provider: Provider, model: &str, body: Value) -> Result<Value, AnalysisError> {
        let key = self.keys.get(provider).ok_or_else(|| {
            upstream(
                provider,
                None,
                format!("{} not configured", provider.key_env()),
                None,
            )
        })?;

        let request = match provider {
            Provider::OpenAi => self.http.post(OPENAI_URL).bearer_auth(key),
            Provider::Gemini => self
                .http
                .post(format!("{}/{}:generateContent", GEMINI_URL, model))
                .header("x-goog-api-key", key),
            Provider::Claude => self
                .http
                .post(CLAUDE_URL)
                .header("x-api-key", key)
                .header("anthropic-version", ANTHROPIC_VERSION),
        };

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| upstream(provider, None, e.to_string(), None))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| upstream(provider, Some(status.as_u16()), e.to_string(), None))?;
        let payload = serde_json::from_str::<Value>(&text).ok();

        if !status.is_success() {
            let payload = payload.or_else(|| (!text.is_empty()).then(|| Value::String(text)));
            return Err(upstream(
                provider,
                Some(status.as_u16()),
                format!("HTTP {}", status),
                payload,
            ));
        }

        payload.ok_or_else(|| {
            upstream(
                provider,
                Some(status.as_u16()),
                "Response body is not JSON".to_string(),
                None,
            )
        })
    }
}

enum AttemptFailure {
    Truncated,
    Failed(AnalysisError),
}

/// Uniform entry point to the three providers
#[derive(Clone)]
pub struct AiGateway {
    transport: Arc<dyn ProviderTransport>,
}

impl AiGateway {
    pub fn new(transport: Arc<dyn ProviderTransport>) -> Self {
        Self { transport }
    }

    pub async fn call_openai(&self, prompt: &str, options: CallOptions) -> Result<String, AnalysisError> {
        self.call(Provider::OpenAi, prompt, options).await
    }

    pub async fn call_gemini(&self, prompt: &str, options: CallOptions) -> Result<String, AnalysisError> {
        self.call(Provider::Gemini, prompt, options).await
    }

    pub async fn call_claude(&self, prompt: &str, options: CallOptions) -> Result<String, AnalysisError> {
        self.call(Provider::Claude, prompt, options).await
    }

    /// Call `provider` and return the completion text
    ///
    /// A truncated completion is never returned: on a non-fallback model it
    /// triggers one retry on the fallback model, on the fallback model it
    /// fails with `EmptyResponse`.
    pub async fn call(
        &self,
        provider: Provider,
        prompt: &str,
        options: CallOptions,
    ) -> Result<String, AnalysisError> {
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| provider.default_model().to_string());
        let fallback = provider.fallback_model();

        match self.attempt(provider, &model, prompt, &options).await {
            Ok(text) => Ok(text),
            Err(AttemptFailure::Truncated) if model != fallback => {
                warn!(
                    provider = %provider,
                    model = %model,
                    fallback = %fallback,
                    "Token limit reached, retrying with fallback model"
                );
                self.attempt(provider, fallback, prompt, &options)
                    .await
                    .map_err(|failure| Self::into_error(provider, fallback, failure))
            }
            Err(failure) => Err(Self::into_error(provider, &model, failure)),
        }
    }

    fn into_error(provider: Provider, model: &str, failure: AttemptFailure) -> AnalysisError {
        let err = match failure {
            AttemptFailure::Truncated => AnalysisError::EmptyResponse { provider },
            AttemptFailure::Failed(err) => err,
        };
        error!(provider = %provider, model = %model, error = %err, "AI provider call failed");
        err
    }

    async fn attempt(
        &self,
        provider: Provider,
        model: &str,
        prompt: &str,
        options: &CallOptions,
    ) -> Result<String, AttemptFailure> {
        info!(
            provider = %provider,
            model = %model,
            prompt_length = prompt.len(),
            "Calling AI provider"
        );

        let body = build_request(provider, model, prompt, options);
        let payload = match self.transport.send(provider, model, body).await {
            Ok(payload) => payload,
            Err(err) => {
                // Some providers report truncation through an error status
                if let AnalysisError::Upstream {
                    payload: Some(ref payload),
                    ..
                } = err
                {
                    let truncated = ProviderResponse::from_json(provider, payload.clone())
                        .map(|r| r.is_truncated())
                        .unwrap_or(false);
                    if truncated {
                        return Err(AttemptFailure::Truncated);
                    }
                }
                return Err(AttemptFailure::Failed(err));
            }
        };

        let response = ProviderResponse::from_json(provider, payload).map_err(|e| {
            warn!(provider = %provider, error = %e, "Unrecognized completion envelope");
            AttemptFailure::Failed(AnalysisError::EmptyResponse { provider })
        })?;

        if response.is_truncated() {
            return Err(AttemptFailure::Truncated);
        }

        let text = response
            .text()
            .ok_or(AttemptFailure::Failed(AnalysisError::EmptyResponse { provider }))?;

        info!(
            provider = %provider,
            model = %model,
            response_length = text.len(),
            "AI provider call successful"
        );
        Ok(text)
    }

    /// Forward a caller-built provider body unchanged (proxy routes)
    ///
    /// For Gemini the `model` field is lifted out of the body into the URL.
    pub async fn forward(&self, provider: Provider, mut body: Value) -> Result<Value, AnalysisError> {
        let model = match provider {
            Provider::Gemini => body.as_object_mut().and_then(|o| o.remove("model")),
            _ => body.get("model").cloned(),
        }
        .and_then(|m| m.as_str().map(str::to_string))
        .unwrap_or_else(|| provider.default_model().to_string());

        info!(provider = %provider, model = %model, "Forwarding raw provider request");
        self.transport.send(provider, &model, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_request_shape() {
        let body = build_request(
            Provider::OpenAi,
            "gpt-4o",
            "hello",
            &CallOptions::new().max_tokens(3000),
        );
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 3000);
        assert_eq!(body["temperature"], 0.3);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_reasoning_model_request_shape() {
        let body = build_request(Provider::OpenAi, "o3-mini", "hi", &CallOptions::new());
        assert_eq!(body["max_completion_tokens"], 1500);
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());

        assert!(!is_reasoning_model("gpt-4o"));
        assert!(is_reasoning_model("o1"));
        assert!(is_reasoning_model("O4-mini"));
    }

    #[test]
    fn test_gemini_request_shape() {
        let body = build_request(Provider::Gemini, "gemini-2.0-flash", "hi", &CallOptions::new());
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
        assert!(body.get("model").is_none());
    }

    #[test]
    fn test_claude_web_search_tool() {
        let plain = build_request(Provider::Claude, "m", "hi", &CallOptions::new());
        assert!(plain.get("tools").is_none());
        assert_eq!(plain["system"], SYSTEM_PROMPT);

        let searching = build_request(Provider::Claude, "m", "hi", &CallOptions::new().web_search());
        assert_eq!(searching["tools"][0]["name"], "web_search");
    }

    #[test]
    fn test_envelope_extraction() {
        let openai = ProviderResponse::from_json(
            Provider::OpenAi,
            json!({ "choices": [{ "message": { "content": "{\"a\":1}" }, "finish_reason": "stop" }] }),
        )
        .unwrap();
        assert_eq!(openai.text().as_deref(), Some("{\"a\":1}"));
        assert!(!openai.is_truncated());

        let claude = ProviderResponse::from_json(
            Provider::Claude,
            json!({
                "content": [
                    { "type": "server_tool_use", "name": "web_search" },
                    { "type": "text", "text": "part one " },
                    { "type": "text", "text": "part two" }
                ],
                "stop_reason": "end_turn"
            }),
        )
        .unwrap();
        assert_eq!(claude.text().as_deref(), Some("part one part two"));
    }

    #[test]
    fn test_truncation_predicates() {
        let gemini = ProviderResponse::from_json(
            Provider::Gemini,
            json!({ "candidates": [{ "content": { "parts": [] }, "finishReason": "MAX_TOKENS" }] }),
        )
        .unwrap();
        assert!(gemini.is_truncated());
        assert!(gemini.text().is_none());

        let openai = ProviderResponse::from_json(
            Provider::OpenAi,
            json!({ "choices": [{ "message": { "content": "cut" }, "finish_reason": "length" }] }),
        )
        .unwrap();
        assert!(openai.is_truncated());

        let claude = ProviderResponse::from_json(
            Provider::Claude,
            json!({ "content": [], "stop_reason": "max_tokens" }),
        )
        .unwrap();
        assert!(claude.is_truncated());
    }

    #[test]
    fn test_blank_text_is_none() {
        let openai = ProviderResponse::from_json(
            Provider::OpenAi,
            json!({ "choices": [{ "message": { "content": "   " } }] }),
        )
        .unwrap();
        assert!(openai.text().is_none());
    }

    #[test]
    fn test_provider_display_and_defaults() {
        assert_eq!(Provider::OpenAi.to_string(), "OpenAI");
        assert_eq!(Provider::Gemini.default_model(), "gemini-2.5-flash");
        assert_eq!(Provider::Gemini.fallback_model(), "gemini-2.0-flash");
        assert_eq!(Provider::Claude.default_max_tokens(), 2000);
    }
}
