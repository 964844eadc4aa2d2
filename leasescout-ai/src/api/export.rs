//! Google Docs export endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::Value;

use crate::api::DataResponse;
use crate::services::docs_exporter::{ExportedDocument, DEFAULT_TITLE};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub data: Option<Value>,
    pub title: Option<String>,
}

/// POST /api/export/docs
///
/// 503 when no Google credentials are configured.
pub async fn export_to_docs(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> ApiResult<Json<DataResponse<ExportedDocument>>> {
    let data = request
        .data
        .filter(|d| !d.is_null())
        .ok_or_else(|| ApiError::BadRequest("Missing required field: data".to_string()))?;
    let title = request
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let document = state.exporter.export(&title, &data).await?;
    Ok(DataResponse::new(document))
}

pub fn export_routes() -> Router<AppState> {
    Router::new().route("/api/export/docs", post(export_to_docs))
}
