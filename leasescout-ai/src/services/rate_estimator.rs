//! Building and land lease rate estimates
//!
//! Estimates never fail the request: any provider, parse or shape problem is
//! logged and replaced by the low-confidence fallback. Only a blank address
//! is rejected, before any call is made.

use tracing::{error, info};

use crate::error::AnalysisError;
use crate::models::{
    BuildingRateEstimate, Estimate, LandRateComparison, LandRateEstimate, RateRequest,
};
use crate::services::ai_gateway::{AiGateway, CallOptions};
use crate::services::prompts;
use crate::utils::parse_json_object;

pub const RATE_MODEL: &str = "gemini-2.0-flash";
pub const RATE_MAX_TOKENS: u32 = 2000;
const RATE_TEMPERATURE: f64 = 0.3;

/// Reject requests without a property address
pub fn require_address(request: &RateRequest) -> Result<(), AnalysisError> {
    if request.property_address.trim().is_empty() {
        return Err(AnalysisError::Validation("Property address is required".to_string()));
    }
    Ok(())
}

fn usable(rate: Option<f64>) -> Option<f64> {
    rate.filter(|r| r.is_finite() && *r != 0.0)
}

fn rate_options() -> CallOptions {
    CallOptions::new()
        .max_tokens(RATE_MAX_TOKENS)
        .temperature(RATE_TEMPERATURE)
}

#[derive(Clone)]
pub struct RateEstimator {
    gateway: AiGateway,
}

impl RateEstimator {
    pub fn new(gateway: AiGateway) -> Self {
        Self { gateway }
    }

    /// Annual building lease rate (USD / sq ft / year) from Gemini
    pub async fn building_rate(
        &self,
        request: &RateRequest,
    ) -> Result<Estimate<BuildingRateEstimate>, AnalysisError> {
        require_address(request)?;
        info!(
            address = %request.property_address,
            property_type = request.property_type.as_deref().unwrap_or("-"),
            "Building rate estimation request"
        );

        let prompt = prompts::building_rate(request);
        let attempt = async {
            let reply = self
                .gateway
                .call_gemini(&prompt, rate_options().model(RATE_MODEL))
                .await?;
            let estimate: BuildingRateEstimate = parse_json_object(&reply, "building rate")?;
            usable(estimate.estimated_rate)
                .ok_or_else(|| AnalysisError::Parse("Invalid rate estimation format".to_string()))?;
            Ok::<_, AnalysisError>(estimate)
        };

        Ok(match attempt.await {
            Ok(estimate) => {
                info!(
                    rate = ?estimate.estimated_rate,
                    confidence = ?estimate.confidence,
                    "Building rate estimation completed"
                );
                Estimate::Estimated(estimate)
            }
            Err(e) => {
                error!(error = %e, address = %request.property_address, "Failed to estimate building rate");
                Estimate::Fallback(Default::default())
            }
        })
    }

    /// IOS land rate (USD / acre / month) from Gemini and OpenAI, run concurrently
    pub async fn land_rate(&self, request: &RateRequest) -> Result<LandRateComparison, AnalysisError> {
        require_address(request)?;
        info!(address = %request.property_address, "Land rate estimation request");

        let prompt = prompts::land_rate(request);
        let (gemini, openai) = tokio::join!(
            self.land_rate_from(&prompt, "Gemini", true),
            self.land_rate_from(&prompt, "OpenAI", false),
        );

        Ok(LandRateComparison { gemini, openai })
    }

    async fn land_rate_from(&self, prompt: &str, label: &str, gemini: bool) -> Estimate<LandRateEstimate> {
        let attempt = async {
            let reply = if gemini {
                self.gateway
                    .call_gemini(prompt, rate_options().model(RATE_MODEL))
                    .await?
            } else {
                self.gateway.call_openai(prompt, rate_options()).await?
            };
            let estimate: LandRateEstimate = parse_json_object(&reply, "land rate")?;
            usable(estimate.average_market_rate)
                .ok_or_else(|| AnalysisError::Parse("Invalid rate estimation format".to_string()))?;
            Ok::<_, AnalysisError>(estimate)
        };

        match attempt.await {
            Ok(estimate) => {
                info!(
                    provider = label,
                    average = ?estimate.average_market_rate,
                    lower = ?estimate.estimated_lower_end,
                    upper = ?estimate.estimated_upper_end,
                    "Land rate estimation completed"
                );
                Estimate::Estimated(estimate)
            }
            Err(e) => {
                error!(provider = label, error = %e, "Failed to estimate land rate");
                Estimate::Fallback(Default::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_address_rejected() {
        let request = RateRequest {
            property_address: "   ".to_string(),
            ..Default::default()
        };
        assert!(matches!(require_address(&request), Err(AnalysisError::Validation(_))));
    }

    #[test]
    fn test_zero_rate_unusable() {
        assert_eq!(usable(Some(0.0)), None);
        assert_eq!(usable(None), None);
        assert_eq!(usable(Some(8.5)), Some(8.5));
    }
}
