//! Market research endpoints

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::DataResponse;
use crate::models::RateRequest;
use crate::services::market_researcher::{CapRateEstimate, DevelopmentEstimate, OverviewEstimate};
use crate::{ApiResult, AppState};

/// POST /api/development-data
pub async fn development_data(
    State(state): State<AppState>,
    Json(request): Json<RateRequest>,
) -> ApiResult<Json<DataResponse<DevelopmentEstimate>>> {
    let data = state.research.development_data(&request).await?;
    Ok(DataResponse::new(data))
}

/// GET /api/market-data/:address
pub async fn market_data(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Json<DataResponse<CapRateEstimate>>> {
    let request = RateRequest {
        property_address: address,
        ..Default::default()
    };
    let analysis = state.research.cap_rates(&request).await?;
    Ok(DataResponse::new(analysis))
}

/// POST /api/market-overview
pub async fn market_overview(
    State(state): State<AppState>,
    Json(request): Json<RateRequest>,
) -> ApiResult<Json<DataResponse<OverviewEstimate>>> {
    let overview = state.research.market_overview(&request).await?;
    Ok(DataResponse::new(overview))
}

pub fn market_routes() -> Router<AppState> {
    Router::new()
        .route("/api/development-data", post(development_data))
        .route("/api/market-data/:address", get(market_data))
        .route("/api/market-overview", post(market_overview))
}
