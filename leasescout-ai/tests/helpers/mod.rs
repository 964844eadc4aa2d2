//! Shared test helpers
//!
//! `MockTransport` replays scripted provider replies in order, one queue per
//! provider, and records every call it receives.

#![allow(dead_code)]

use async_trait::async_trait;
use leasescout_ai::error::AnalysisError;
use leasescout_ai::services::ai_gateway::{AiGateway, Provider, ProviderTransport};
use leasescout_ai::services::{CensusClient, DocsExporter, ProgressTracker};
use leasescout_ai::AppState;
use leasescout_common::events::EventBus;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One request seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub provider: Provider,
    pub model: String,
    pub body: Value,
}

enum Scripted {
    Reply(Result<Value, AnalysisError>),
    Panic,
}

#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<Provider, VecDeque<Scripted>>>,
    calls: Mutex<Vec<RecordedCall>>,
    latency: Mutex<Option<Duration>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a provider-native reply
    pub fn push(&self, provider: Provider, reply: Value) -> &Self {
        self.push_result(provider, Ok(reply))
    }

    /// Queue a transport failure
    pub fn push_error(&self, provider: Provider, message: &str) -> &Self {
        self.push_result(
            provider,
            Err(AnalysisError::Upstream {
                provider,
                status: Some(500),
                message: message.to_string(),
                payload: None,
            }),
        )
    }

    /// Make the next call to `provider` panic inside the transport
    pub fn push_panic(&self, provider: Provider) -> &Self {
        self.enqueue(provider, Scripted::Panic)
    }

    /// Delay every reply by `latency`
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    fn push_result(&self, provider: Provider, reply: Result<Value, AnalysisError>) -> &Self {
        self.enqueue(provider, Scripted::Reply(reply))
    }

    fn enqueue(&self, provider: Provider, scripted: Scripted) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(provider)
            .or_default()
            .push_back(scripted);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, provider: Provider) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.provider == provider)
            .collect()
    }
}

#[async_trait]
impl ProviderTransport for MockTransport {
    async fn send(&self, provider: Provider, model: &str, body: Value) -> Result<Value, AnalysisError> {
        self.calls.lock().unwrap().push(RecordedCall {
            provider,
            model: model.to_string(),
            body,
        });

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let next = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&provider)
            .and_then(VecDeque::pop_front);
        match next {
            Some(Scripted::Reply(reply)) => reply,
            Some(Scripted::Panic) => panic!("scripted transport panic"),
            None => Err(AnalysisError::Upstream {
                provider,
                status: None,
                message: "no scripted reply".to_string(),
                payload: None,
            }),
        }
    }
}

pub fn gateway(mock: &Arc<MockTransport>) -> AiGateway {
    AiGateway::new(mock.clone())
}

/// App state whose providers are all served by `mock`
///
/// Census and Docs clients are built but never reach the network in tests.
pub fn app_state(mock: &Arc<MockTransport>) -> AppState {
    let tracker = ProgressTracker::new(EventBus::new(100));
    app_state_with_tracker(mock, tracker)
}

pub fn app_state_with_tracker(mock: &Arc<MockTransport>, tracker: ProgressTracker) -> AppState {
    AppState::with_tracker(
        gateway(mock),
        tracker,
        CensusClient::with_base_url(None, "http://127.0.0.1:9").unwrap(),
        DocsExporter::new(None, None).unwrap(),
    )
}

// ----- provider-native reply bodies -----

pub fn openai_reply(text: &str) -> Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": text }, "finish_reason": "stop" }]
    })
}

pub fn openai_truncated(text: &str) -> Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": text }, "finish_reason": "length" }]
    })
}

pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] }, "finishReason": "STOP" }]
    })
}

pub fn gemini_truncated(text: &str) -> Value {
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] }, "finishReason": "MAX_TOKENS" }]
    })
}

pub fn claude_reply(text: &str) -> Value {
    json!({
        "content": [
            { "type": "server_tool_use", "id": "srvtoolu_1", "name": "web_search" },
            { "type": "text", "text": text }
        ],
        "stop_reason": "end_turn"
    })
}

// ----- analysis fixtures -----

pub fn building_json() -> String {
    json!({
        "configuration": "Cross-dock",
        "marketFit": "Strong regional distribution fit",
        "propertyFeatures": ["32' clear height", "48 dock doors"],
        "briefPropertyInfo": "Modern cross-dock near I-40"
    })
    .to_string()
}

pub fn market_json() -> String {
    json!({
        "areaGrowthScore": 8,
        "areaGrowthTrends": "Population up 2% a year",
        "nationalIndustryTrend": "E-commerce logistics expanding",
        "boomingIndustry": "3PL",
        "recentRealEstateNews": "New intermodal terminal announced",
        "competitiveFactors": ["Low vacancy"]
    })
    .to_string()
}

/// Discovery reply listing `count` distinct tenants
pub fn discovery_json(count: usize) -> String {
    let industries = ["3PL", "Manufacturing", "Food", "Tech", "Retail", "Other"];
    let tenants: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "company": format!("Tenant {:02}", i),
                "operations": "Regional distribution and light assembly",
                "industryType": industries[i % industries.len()],
                "nearbyLocation": "Memphis, TN",
                "distance": format!("{}", 3 + (i * 7) % 60),
                "benefitType": "warehouse_space"
            })
        })
        .collect();
    json!({ "tenants": tenants }).to_string()
}

pub fn property_data(use_ai_scoring: bool) -> Value {
    json!({
        "address": "100 Industrial Way, Memphis, TN 38118",
        "type": "warehouse",
        "squareFootage": 150000,
        "acreage": 12.5,
        "features": ["Rail spur", "Cold storage"],
        "use_ai_scoring": use_ai_scoring
    })
}
