//! Rate estimate and investment recommendation endpoints

use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::DataResponse;
use crate::models::{
    BuildingRateEstimate, Estimate, InvestmentRecommendation, LandRateEstimate, RateRequest,
};
use crate::{ApiResult, AppState};

/// Land rate response: Gemini under `data`, OpenAI under `dataOpenAI`
#[derive(Debug, Serialize)]
pub struct LandRateResponse {
    pub success: bool,
    pub data: Estimate<LandRateEstimate>,
    #[serde(rename = "dataOpenAI")]
    pub data_openai: Estimate<LandRateEstimate>,
    pub timestamp: DateTime<Utc>,
}

/// POST /api/building-rate/estimate
pub async fn estimate_building_rate(
    State(state): State<AppState>,
    Json(request): Json<RateRequest>,
) -> ApiResult<Json<DataResponse<Estimate<BuildingRateEstimate>>>> {
    let estimate = state.rates.building_rate(&request).await?;
    Ok(DataResponse::new(estimate))
}

/// POST /api/building-rate/estimate-land
pub async fn estimate_land_rate(
    State(state): State<AppState>,
    Json(request): Json<RateRequest>,
) -> ApiResult<Json<LandRateResponse>> {
    let comparison = state.rates.land_rate(&request).await?;
    Ok(Json(LandRateResponse {
        success: true,
        data: comparison.gemini,
        data_openai: comparison.openai,
        timestamp: Utc::now(),
    }))
}

/// POST /api/investment-recommendation
pub async fn investment_recommendation(
    State(state): State<AppState>,
    Json(request): Json<RateRequest>,
) -> ApiResult<Json<DataResponse<InvestmentRecommendation>>> {
    let recommendation = state.advisor.recommend(&request).await?;
    Ok(DataResponse::new(recommendation))
}

pub fn rate_routes() -> Router<AppState> {
    Router::new()
        .route("/api/building-rate/estimate", post(estimate_building_rate))
        .route("/api/building-rate/estimate-land", post(estimate_land_rate))
        .route("/api/investment-recommendation", post(investment_recommendation))
}
