//! Census data endpoints
//!
//! The address path segment is percent-decoded by the extractor.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::info;

use crate::api::DataResponse;
use crate::services::census_client::{Demographics, IndustrialData};
use crate::{ApiError, ApiResult, AppState};

/// GET /api/demographics/:address
pub async fn get_demographics(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Json<DataResponse<Demographics>>> {
    info!(address = %address, "Demographics request");
    let demographics = state.census.demographics_for_address(&address).await?;
    Ok(DataResponse::new(demographics))
}

/// GET /api/industrial/:address
pub async fn get_industrial(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Json<DataResponse<IndustrialData>>> {
    info!(address = %address, "Industrial data request");
    let industrial = state
        .census
        .industrial_for_address(&address)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No industrial data available for {}", address)))?;
    Ok(DataResponse::new(industrial))
}

pub fn census_routes() -> Router<AppState> {
    Router::new()
        .route("/api/demographics/:address", get(get_demographics))
        .route("/api/industrial/:address", get(get_industrial))
}
