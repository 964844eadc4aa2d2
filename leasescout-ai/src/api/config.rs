//! Discovery configuration endpoints
//!
//! GET    /api/config/prompt        current configuration
//! POST   /api/config/prompt        partial update (validated)
//! POST   /api/config/prompt/reset  restore defaults

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::models::{DiscoveryConfig, DiscoveryConfigPatch};
use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct ConfigUpdateResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub config: DiscoveryConfig,
}

pub async fn get_prompt_config(State(state): State<AppState>) -> Json<DiscoveryConfig> {
    Json(state.config_store.snapshot().await)
}

/// Rejects `result_count` outside 1–50 with 400, leaving the stored config untouched
pub async fn update_prompt_config(
    State(state): State<AppState>,
    Json(patch): Json<DiscoveryConfigPatch>,
) -> ApiResult<Json<ConfigUpdateResponse>> {
    let config = state.config_store.update(patch).await?;

    Ok(Json(ConfigUpdateResponse {
        status: "success",
        message: "Discovery configuration updated",
        config,
    }))
}

pub async fn reset_prompt_config(State(state): State<AppState>) -> Json<ConfigUpdateResponse> {
    let config = state.config_store.reset().await;

    Json(ConfigUpdateResponse {
        status: "success",
        message: "Discovery configuration reset to defaults",
        config,
    })
}

pub fn config_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/config/prompt",
            get(get_prompt_config).post(update_prompt_config),
        )
        .route("/api/config/prompt/reset", post(reset_prompt_config))
}
