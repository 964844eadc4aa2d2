//! Integration tests for leasescout-ai HTTP endpoints
//!
//! Requests go through the full router with `oneshot`; providers are the
//! scripted mock, so no test touches the network.

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use helpers::*;
use http_body_util::BodyExt;
use leasescout_ai::services::ai_gateway::Provider;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

fn create_test_app(mock: &Arc<MockTransport>) -> Router {
    leasescout_ai::build_router(app_state(mock))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(&MockTransport::new());

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "leasescout-ai");
    assert_eq!(body["active_sessions"], 0);
    assert!(body.get("last_error").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = create_test_app(&MockTransport::new());

    let (status, body) = get(&app, "/api/nothing-here").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_prompt_config_update_and_reset() {
    let app = create_test_app(&MockTransport::new());

    let (status, body) = get(&app, "/api/config/prompt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result_count"], 20);
    assert_eq!(body["search_radius_miles"], 100);

    let (status, body) = post(&app, "/api/config/prompt", json!({ "result_count": 10, "tone": "brief" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["config"]["result_count"], 10);

    let (status, body) = post(&app, "/api/config/prompt", json!({ "result_count": 51 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    let (_, body) = get(&app, "/api/config/prompt").await;
    assert_eq!(body["result_count"], 10);

    let (status, body) = post(&app, "/api/config/prompt/reset", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["config"]["result_count"], 20);
}

#[tokio::test]
async fn test_analyze_requires_property_data() {
    let mock = MockTransport::new();
    let app = create_test_app(&mock);

    let (status, _) = post(&app, "/api/tenant-research/analyze", json!({ "withProgress": false })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(
        &app,
        "/api/tenant-research/analyze",
        json!({ "propertyData": { "type": "warehouse" }, "withProgress": true, "sessionId": "s1" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("propertyData.address"));
    assert_eq!(mock.call_count(), 0);

    let (status, _) = get(&app, "/api/tenant-research/progress/s1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analyze_with_progress() {
    let mock = MockTransport::new();
    mock.push(Provider::Gemini, gemini_reply(&building_json()));
    mock.push(Provider::OpenAi, openai_reply(&market_json()));
    mock.push(Provider::OpenAi, openai_reply(&discovery_json(6)));
    let app = create_test_app(&mock);

    let (status, body) = post(
        &app,
        "/api/tenant-research/analyze",
        json!({ "propertyData": property_data(false), "withProgress": true, "sessionId": "client-1" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["sessionId"], "client-1");
    assert_eq!(body["version"], "leasescout_v2.0");
    assert_eq!(body["data"]["tenantRanking"].as_array().unwrap().len(), 6);
    assert_eq!(body["data"]["metadata"]["totalSteps"], 3);

    let (status, body) = get(&app, "/api/tenant-research/progress/client-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "client-1");
    assert_eq!(body["progress"]["completed"], true);
    assert_eq!(body["progress"]["step"], 3);
    assert_eq!(body["progress"]["totalSteps"], 3);
}

#[tokio::test(start_paused = true)]
async fn test_analysis_continues_after_client_disconnect() {
    let mock = MockTransport::new();
    mock.set_latency(Duration::from_secs(5));
    mock.push(Provider::Gemini, gemini_reply(&building_json()));
    mock.push(Provider::OpenAi, openai_reply(&market_json()));
    mock.push(Provider::OpenAi, openai_reply(&discovery_json(4)));
    let state = app_state(&mock);
    let tracker = state.tracker.clone();
    let app = leasescout_ai::build_router(state);

    let request = Request::builder()
        .method("POST")
        .uri("/api/tenant-research/analyze")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "propertyData": property_data(false), "withProgress": true, "sessionId": "gone" })
                .to_string(),
        ))
        .unwrap();

    // Client gives up during stage 2
    let outcome = tokio::time::timeout(Duration::from_secs(7), app.oneshot(request)).await;
    assert!(outcome.is_err());
    assert!(!tracker.get_progress("gone").await.unwrap().completed);

    tokio::time::sleep(Duration::from_secs(60)).await;

    let progress = tracker.get_progress("gone").await.unwrap();
    assert!(progress.completed);
    assert!(progress.error.is_none());
    assert_eq!(progress.step, 3);
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn test_analysis_panic_returns_500_and_errors_session() {
    let mock = MockTransport::new();
    mock.push_panic(Provider::Gemini);
    let state = app_state(&mock);
    let tracker = state.tracker.clone();
    let app = leasescout_ai::build_router(state);

    let (status, body) = post(
        &app,
        "/api/tenant-research/analyze",
        json!({ "propertyData": property_data(false), "withProgress": true, "sessionId": "boom" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    let progress = tracker.get_progress("boom").await.unwrap();
    assert!(progress.completed);
    assert!(progress.error.is_some());

    let (_, health) = get(&app, "/health").await;
    assert!(health["last_error"].as_str().is_some());
}

#[tokio::test]
async fn test_analyze_without_progress_has_no_session() {
    let mock = MockTransport::new();
    mock.push(Provider::Gemini, gemini_reply(&building_json()));
    mock.push(Provider::OpenAi, openai_reply(&market_json()));
    mock.push(Provider::OpenAi, openai_reply(&discovery_json(2)));
    let app = create_test_app(&mock);

    let (status, body) = post(
        &app,
        "/api/tenant-research/analyze",
        json!({ "propertyData": property_data(false), "sessionId": "ignored" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], Value::Null);
    let (status, _) = get(&app, "/api/tenant-research/progress/ignored").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_progress_session_is_404() {
    let app = create_test_app(&MockTransport::new());

    let (status, body) = get(&app, "/api/tenant-research/progress/missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_building_rate_fallback_and_validation() {
    let mock = MockTransport::new();
    mock.push(Provider::Gemini, gemini_reply("I cannot estimate this."));
    let app = create_test_app(&mock);

    let (status, _) = post(&app, "/api/building-rate/estimate", json!({ "propertyAddress": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(mock.call_count(), 0);

    let (status, body) = post(
        &app,
        "/api/building-rate/estimate",
        json!({ "propertyAddress": "100 Industrial Way, Memphis, TN", "buildingSize": 150000 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "estimatedRate": 7.0, "confidence": "low", "error": true }));
}

#[tokio::test]
async fn test_building_rate_estimate() {
    let mock = MockTransport::new();
    mock.push(
        Provider::Gemini,
        gemini_reply("```json\n{\"estimatedRate\": 6.75, \"confidence\": \"medium\"}\n```"),
    );
    let app = create_test_app(&mock);

    let (status, body) = post(
        &app,
        "/api/building-rate/estimate",
        json!({ "propertyAddress": "100 Industrial Way, Memphis, TN" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["estimatedRate"], 6.75);
    assert_eq!(body["data"]["confidence"], "medium");
    assert_eq!(mock.calls()[0].model, "gemini-2.0-flash");
}

#[tokio::test]
async fn test_land_rate_queries_both_providers() {
    let mock = MockTransport::new();
    mock.push(
        Provider::Gemini,
        gemini_reply("{\"averageMarketRate\": 4200, \"estimatedLowerEnd\": 3500, \"estimatedUpperEnd\": 5000, \"confidence\": \"high\"}"),
    );
    mock.push_error(Provider::OpenAi, "rate limited");
    let app = create_test_app(&mock);

    let (status, body) = post(
        &app,
        "/api/building-rate/estimate-land",
        json!({ "propertyAddress": "100 Industrial Way, Memphis, TN" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["averageMarketRate"], 4200.0);
    assert_eq!(body["data"]["confidence"], "high");
    assert_eq!(body["dataOpenAI"]["error"], true);
    assert_eq!(mock.calls_to(Provider::Gemini).len(), 1);
    assert_eq!(mock.calls_to(Provider::OpenAi).len(), 1);
}

#[tokio::test]
async fn test_investment_recommendation() {
    let mock = MockTransport::new();
    mock.push(
        Provider::Claude,
        claude_reply(
            "<json>{\"propertyAnalysis\": {\"strengths\": [\"Rail\"], \"risks\": []}, \
             \"investmentSummary\": {\"timing\": \"Favorable\", \"summary\": \"Buy\"}}</json>",
        ),
    );
    let app = create_test_app(&mock);

    let (status, body) = post(
        &app,
        "/api/investment-recommendation",
        json!({ "propertyAddress": "100 Industrial Way, Memphis, TN", "askingPrice": "$12M" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["propertyAnalysis"]["strengths"][0], "Rail");
    assert_eq!(body["data"]["investmentSummary"]["timing"], "Favorable");

    let call = &mock.calls()[0];
    assert_eq!(call.body["max_tokens"], 10000);
    assert_eq!(call.body["tools"][0]["name"], "web_search");
}

#[tokio::test]
async fn test_investment_recommendation_failure_is_502() {
    let mock = MockTransport::new();
    mock.push(Provider::Claude, claude_reply("Sorry, no data."));
    let app = create_test_app(&mock);

    let (status, body) = post(
        &app,
        "/api/investment-recommendation",
        json!({ "propertyAddress": "100 Industrial Way, Memphis, TN" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_export_without_credentials_is_503() {
    let app = create_test_app(&MockTransport::new());

    let (status, body) = post(&app, "/api/export/docs", json!({ "data": "report", "title": "T" })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "UNAVAILABLE");

    let (status, _) = post(&app, "/api/export/docs", json!({ "title": "T" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_proxy_passes_provider_json_through() {
    let mock = MockTransport::new();
    let raw = openai_reply("proxied");
    mock.push(Provider::OpenAi, raw.clone());
    let app = create_test_app(&mock);

    let request = json!({ "model": "gpt-4o", "messages": [{ "role": "user", "content": "hi" }] });
    let (status, body) = post(&app, "/proxy/openai", request.clone()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, raw);
    assert_eq!(mock.calls()[0].body, request);
}

#[tokio::test]
async fn test_proxy_upstream_failure_is_502() {
    let mock = MockTransport::new();
    mock.push_error(Provider::Gemini, "bad key");
    let app = create_test_app(&mock);

    let (status, _) = post(&app, "/proxy/gemini", json!({ "contents": [] })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_census_routes_reject_unusable_addresses() {
    let app = create_test_app(&MockTransport::new());

    let (status, body) = get(&app, "/api/demographics/Memphis%20TN").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("Could not parse address"));

    let (status, _) = get(&app, "/api/industrial/Somewhere%2C%20ZZ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_development_data_with_web_research() {
    let mock = MockTransport::new();
    mock.push(
        Provider::Claude,
        claude_reply(
            "<json>{\"region\": \"Memphis, TN\", \"growthStatus\": \"Growing\", \
             \"developments\": [{\"name\": \"BNSF intermodal expansion\", \"impact\": \"positive\"}], \
             \"offshoringActivity\": []}</json>",
        ),
    );
    let app = create_test_app(&mock);

    let (status, body) = post(
        &app,
        "/api/development-data",
        json!({ "propertyAddress": "100 Industrial Way, Memphis, TN", "propertyType": "warehouse" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["growthStatus"], "Growing");
    assert_eq!(body["data"]["developments"][0]["name"], "BNSF intermodal expansion");
    assert!(body["data"].get("error").is_none());
    assert_eq!(mock.calls_to(Provider::Claude)[0].body["tools"][0]["name"], "web_search");
}

#[tokio::test]
async fn test_development_data_fallback_and_validation() {
    let mock = MockTransport::new();
    mock.push_error(Provider::Claude, "overloaded");
    let app = create_test_app(&mock);

    let (status, _) = post(&app, "/api/development-data", json!({ "propertyType": "warehouse" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(mock.call_count(), 0);

    let (status, body) = post(
        &app,
        "/api/development-data",
        json!({ "propertyAddress": "100 Industrial Way, Memphis, TN" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "growthStatus": "Unknown",
            "growthSummary": "No data available",
            "developmentsCount": 0,
            "offshoringCount": 0,
            "error": true
        })
    );
}

#[tokio::test]
async fn test_market_cap_rates_by_address() {
    let mock = MockTransport::new();
    mock.push(
        Provider::OpenAi,
        openai_reply(
            &json!({
                "region": "Memphis, TN",
                "year": 2024,
                "marketAverages": [{ "label": "Overall Market", "range": "6.5% - 8.0%" }],
                "comparableSales": []
            })
            .to_string(),
        ),
    );
    mock.push(Provider::OpenAi, openai_reply("{\"region\": \"Memphis, TN\"}"));
    let app = create_test_app(&mock);

    let (status, body) = get(&app, "/api/market-data/100%20Industrial%20Way%2C%20Memphis%2C%20TN").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["region"], "Memphis, TN");
    assert_eq!(body["data"]["marketAverages"][0]["range"], "6.5% - 8.0%");
    assert!(body["data"].get("error").is_none());

    // No market averages: reference analysis, flagged
    let (status, body) = get(&app, "/api/market-data/100%20Industrial%20Way%2C%20Memphis%2C%20TN").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["region"], "Baltimore");
    assert_eq!(body["data"]["error"], true);

    let (status, _) = get(&app, "/api/market-data/%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn test_market_overview() {
    let mock = MockTransport::new();
    mock.push(
        Provider::OpenAi,
        openai_reply(
            &json!({
                "region": "Memphis, TN",
                "economicOutlook": { "status": "Growing", "description": "Logistics demand" },
                "vacancyRate": { "value": "5.1%", "source": "CBRE Q2 2024" },
                "taxIncentives": [{ "name": "PILOT", "description": "Property tax abatement" }]
            })
            .to_string(),
        ),
    );
    mock.push(Provider::OpenAi, openai_reply("no data"));
    let app = create_test_app(&mock);
    let request = json!({ "propertyAddress": "100 Industrial Way, Memphis, TN" });

    let (status, body) = post(&app, "/api/market-overview", request.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["economicOutlook"]["status"], "Growing");
    assert_eq!(body["data"]["vacancyRate"]["value"], "5.1%");
    assert_eq!(body["data"]["taxIncentives"][0]["name"], "PILOT");

    let (status, body) = post(&app, "/api/market-overview", request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["economicOutlook"]["status"], "Unknown");
    assert_eq!(body["data"]["error"], true);
}
