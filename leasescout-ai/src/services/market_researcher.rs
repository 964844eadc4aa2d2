//! Market research around a property
//!
//! Nearby developments (Claude with web search), cap rates and a market
//! overview (OpenAI). Like the rate estimates, research never fails the
//! request: provider, parse and shape problems are logged and replaced by a
//! placeholder flagged with `error: true`. A blank address is rejected
//! before any call.

use tracing::{error, info};

use crate::error::AnalysisError;
use crate::models::{
    CapRateAnalysis, CapRateFallback, DevelopmentData, DevelopmentFallback, Estimate,
    MarketOverview, OverviewFallback, RateRequest,
};
use crate::services::ai_gateway::{AiGateway, CallOptions};
use crate::services::prompts;
use crate::services::rate_estimator::require_address;
use crate::utils::{extract_tagged_json, parse_json_object};

pub const DEVELOPMENT_MODEL: &str = "claude-sonnet-4-20250514";
pub const RESEARCH_MAX_TOKENS: u32 = 2000;
const RESEARCH_TEMPERATURE: f64 = 0.3;

pub type DevelopmentEstimate = Estimate<DevelopmentData, DevelopmentFallback>;
pub type CapRateEstimate = Estimate<CapRateAnalysis, CapRateFallback>;
pub type OverviewEstimate = Estimate<MarketOverview, OverviewFallback>;

fn research_options() -> CallOptions {
    CallOptions::new()
        .max_tokens(RESEARCH_MAX_TOKENS)
        .temperature(RESEARCH_TEMPERATURE)
}

/// Decode development research from a Claude completion
pub fn parse_development_data(text: &str) -> Result<DevelopmentData, AnalysisError> {
    let json = extract_tagged_json(text).ok_or_else(|| {
        AnalysisError::Parse("No valid JSON block found in Claude response text".to_string())
    })?;
    let data: DevelopmentData = serde_json::from_str(json).map_err(|e| {
        AnalysisError::Parse(format!("Failed to parse JSON from Claude response: {}", e))
    })?;
    if data.growth_status.trim().is_empty() {
        return Err(AnalysisError::Parse("Development research has no growth status".to_string()));
    }
    Ok(data)
}

#[derive(Clone)]
pub struct MarketResearcher {
    gateway: AiGateway,
}

impl MarketResearcher {
    pub fn new(gateway: AiGateway) -> Self {
        Self { gateway }
    }

    /// Developments, offshoring activity and growth status within 30 miles
    pub async fn development_data(&self, request: &RateRequest) -> Result<DevelopmentEstimate, AnalysisError> {
        require_address(request)?;
        info!(
            address = %request.property_address,
            property_type = request.property_type.as_deref().unwrap_or("-"),
            building_size = request.building_size.as_deref().unwrap_or("-"),
            "Development data request"
        );

        let prompt = prompts::development_data(request);
        let attempt = async {
            let options = research_options().model(DEVELOPMENT_MODEL).web_search();
            let reply = self.gateway.call_claude(&prompt, options).await?;
            parse_development_data(&reply)
        };

        Ok(match attempt.await {
            Ok(data) => {
                info!(
                    region = %data.region,
                    growth_status = %data.growth_status,
                    developments = data.developments.len(),
                    offshoring = data.offshoring_activity.len(),
                    "Development data research completed"
                );
                Estimate::Estimated(data)
            }
            Err(e) => {
                error!(error = %e, address = %request.property_address, "Failed to research development data");
                Estimate::Fallback(DevelopmentFallback::default())
            }
        })
    }

    /// Market cap rates and comparable sales
    pub async fn cap_rates(&self, request: &RateRequest) -> Result<CapRateEstimate, AnalysisError> {
        require_address(request)?;
        info!(address = %request.property_address, "Market cap rate request");

        let prompt = prompts::cap_rate_analysis(request);
        let attempt = async {
            let reply = self.gateway.call_openai(&prompt, research_options()).await?;
            let analysis: CapRateAnalysis = parse_json_object(&reply, "cap rate analysis")?;
            if analysis.market_averages.is_empty() {
                return Err(AnalysisError::Parse("Cap rate analysis has no market averages".to_string()));
            }
            Ok(analysis)
        };

        Ok(match attempt.await {
            Ok(analysis) => {
                info!(
                    region = %analysis.region,
                    year = ?analysis.year,
                    averages = analysis.market_averages.len(),
                    comparables = analysis.comparable_sales.len(),
                    "Market cap rate research completed"
                );
                Estimate::Estimated(analysis)
            }
            Err(e) => {
                error!(error = %e, address = %request.property_address, "Market cap rate research failed");
                Estimate::Fallback(CapRateFallback::default())
            }
        })
    }

    /// Economic outlook, vacancy, absorption, lease and cap rates, incentives
    pub async fn market_overview(&self, request: &RateRequest) -> Result<OverviewEstimate, AnalysisError> {
        require_address(request)?;
        info!(address = %request.property_address, "Market overview request");

        let prompt = prompts::market_overview(request);
        let attempt = async {
            let reply = self.gateway.call_openai(&prompt, research_options()).await?;
            let overview: MarketOverview = parse_json_object(&reply, "market overview")?;
            if overview.economic_outlook.status.trim().is_empty() {
                return Err(AnalysisError::Parse("Market overview has no economic outlook".to_string()));
            }
            Ok(overview)
        };

        Ok(match attempt.await {
            Ok(overview) => {
                info!(
                    region = %overview.region,
                    outlook = %overview.economic_outlook.status,
                    incentives = overview.tax_incentives.len(),
                    "Market overview research completed"
                );
                Estimate::Estimated(overview)
            }
            Err(e) => {
                error!(error = %e, address = %request.property_address, "Market overview research failed");
                Estimate::Fallback(OverviewFallback::default())
            }
        })
    }
}
