//! Tenant research endpoints
//!
//! The POST waits for the analysis, which runs on its own task and finishes
//! even if the client disconnects. Clients wanting progress pass
//! `withProgress` (and usually their own `sessionId`) and poll the progress
//! route, or subscribe to the SSE stream, while the POST is in flight.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::sse::progress_event_stream;
use crate::error::AnalysisError;
use crate::models::analysis::PROMPT_VERSION;
use crate::models::{AnalysisReport, ProgressSnapshot, PropertyInput};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub property_data: Option<PropertyInput>,
    #[serde(default)]
    pub with_progress: bool,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub data: AnalysisReport,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub success: bool,
    pub progress: ProgressSnapshot,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Session id to track, if progress was requested
///
/// A blank or absent id with `withProgress` gets a fresh v4 UUID.
fn progress_session(request: &AnalyzeRequest) -> Option<String> {
    if !request.with_progress {
        return None;
    }
    match request.session_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => Some(id.to_string()),
        _ => Some(Uuid::new_v4().to_string()),
    }
}

/// POST /api/tenant-research/analyze
pub async fn analyze_property(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let session_id = progress_session(&request);
    let property = request
        .property_data
        .ok_or_else(|| ApiError::BadRequest("Missing required field: propertyData".to_string()))?;

    info!(
        address = property.address.as_deref().unwrap_or("-"),
        session_id = session_id.as_deref().unwrap_or("-"),
        "Tenant research analysis requested"
    );

    let report = match state.pipeline.spawn_analysis(property, session_id.clone()).await {
        Ok(report) => report,
        Err(e) => {
            if !matches!(e, AnalysisError::Validation(_)) {
                error!(error = %e, "Tenant research analysis failed");
                state.record_error(e.to_string()).await;
            }
            return Err(e.into());
        }
    };

    Ok(Json(AnalyzeResponse {
        success: true,
        data: report,
        timestamp: Utc::now(),
        version: PROMPT_VERSION,
        session_id,
    }))
}

/// GET /api/tenant-research/progress/:session_id
pub async fn get_progress(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ProgressResponse>> {
    let progress = state
        .tracker
        .get_progress(&session_id)
        .await
        .ok_or_else(|| AnalysisError::SessionNotFound(session_id.clone()))?;

    Ok(Json(ProgressResponse {
        success: true,
        progress,
        session_id,
        timestamp: Utc::now(),
    }))
}

pub fn tenant_research_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tenant-research/analyze", post(analyze_property))
        .route("/api/tenant-research/progress/:session_id", get(get_progress))
        .route("/api/tenant-research/events", get(progress_event_stream))
}
