//! Raw provider pass-through
//!
//! The body is forwarded as-is with the server's credentials and the
//! provider's JSON is returned untouched.

use axum::{extract::State, routing::post, Json, Router};
use serde_json::Value;
use tracing::error;

use crate::services::ai_gateway::Provider;
use crate::{ApiResult, AppState};

async fn forward(state: &AppState, provider: Provider, body: Value) -> ApiResult<Json<Value>> {
    match state.gateway.forward(provider, body).await {
        Ok(reply) => Ok(Json(reply)),
        Err(e) => {
            error!(provider = %provider, error = %e, "Proxy request failed");
            Err(e.into())
        }
    }
}

/// POST /proxy/openai
pub async fn proxy_openai(State(state): State<AppState>, Json(body): Json<Value>) -> ApiResult<Json<Value>> {
    forward(&state, Provider::OpenAi, body).await
}

/// POST /proxy/gemini
pub async fn proxy_gemini(State(state): State<AppState>, Json(body): Json<Value>) -> ApiResult<Json<Value>> {
    forward(&state, Provider::Gemini, body).await
}

pub fn proxy_routes() -> Router<AppState> {
    Router::new()
        .route("/proxy/openai", post(proxy_openai))
        .route("/proxy/gemini", post(proxy_gemini))
}
