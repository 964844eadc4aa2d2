//! Investment recommendation backed by Claude web research

use tracing::info;

use crate::error::AnalysisError;
use crate::models::{InvestmentRecommendation, RateRequest};
use crate::services::ai_gateway::{AiGateway, CallOptions};
use crate::services::prompts;
use crate::services::rate_estimator::require_address;
use crate::utils::extract_tagged_json;

pub const RECOMMENDATION_MODEL: &str = "claude-sonnet-4-20250514";
pub const RECOMMENDATION_MAX_TOKENS: u32 = 10_000;

/// Decode the recommendation from a Claude completion
pub fn parse_recommendation(text: &str) -> Result<InvestmentRecommendation, AnalysisError> {
    let json = extract_tagged_json(text).ok_or_else(|| {
        AnalysisError::Parse("No valid JSON block found in Claude response text".to_string())
    })?;
    serde_json::from_str(json).map_err(|e| {
        AnalysisError::Parse(format!("Failed to parse JSON from Claude response: {}", e))
    })
}

#[derive(Clone)]
pub struct InvestmentAdvisor {
    gateway: AiGateway,
}

impl InvestmentAdvisor {
    pub fn new(gateway: AiGateway) -> Self {
        Self { gateway }
    }

    /// Failures propagate to the caller
    pub async fn recommend(&self, request: &RateRequest) -> Result<InvestmentRecommendation, AnalysisError> {
        require_address(request)?;
        info!(
            address = %request.property_address,
            asking_price = request.asking_price.as_deref().unwrap_or("-"),
            "Investment recommendation request"
        );

        let prompt = prompts::investment_recommendation(request);
        let options = CallOptions::new()
            .model(RECOMMENDATION_MODEL)
            .max_tokens(RECOMMENDATION_MAX_TOKENS)
            .temperature(0.3)
            .web_search();
        let reply = self.gateway.call_claude(&prompt, options).await?;
        let recommendation = parse_recommendation(&reply)?;

        info!(
            address = %request.property_address,
            key_strengths = recommendation.investment_summary.key_strengths.len(),
            "Investment recommendation completed"
        );
        Ok(recommendation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_reply() {
        let text = "Research done.\n<json>\n{\"investmentSummary\": {\"timing\": \"Now\", \"keyStrengths\": [\"Port access\"]}}\n</json>";
        let parsed = parse_recommendation(text).unwrap();
        assert_eq!(parsed.investment_summary.timing, "Now");
        assert_eq!(parsed.investment_summary.key_strengths, vec!["Port access"]);
        assert!(parsed.property_analysis.strengths.is_empty());
    }

    #[test]
    fn test_unparseable_reply() {
        assert!(matches!(
            parse_recommendation("I could not find anything."),
            Err(AnalysisError::Parse(_))
        ));
        assert!(matches!(
            parse_recommendation("<json>{not json}</json>"),
            Err(AnalysisError::Parse(_))
        ));
    }
}
