//! Rate estimates and investment recommendation payloads

use serde::{Deserialize, Serialize};

use super::lenient;

/// Rate reported when an estimate cannot be produced
pub const FALLBACK_RATE: f64 = 7.0;

/// Property description shared by the rate and recommendation endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    pub property_address: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub building_size: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub asking_price: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Annual building lease rate in USD per square foot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingRateEstimate {
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub estimated_rate: Option<f64>,
    pub confidence: Confidence,
}

/// IOS land lease rate in USD per acre per month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandRateEstimate {
    #[serde(deserialize_with = "lenient::opt_f64")]
    pub average_market_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub estimated_lower_end: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub estimated_upper_end: Option<f64>,
    pub confidence: Confidence,
}

/// Placeholder returned instead of an error
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackEstimate {
    pub estimated_rate: f64,
    pub confidence: Confidence,
    pub error: bool,
}

impl Default for FallbackEstimate {
    fn default() -> Self {
        Self {
            estimated_rate: FALLBACK_RATE,
            confidence: Confidence::Low,
            error: true,
        }
    }
}

/// Either a parsed estimate or a placeholder flagged with `error: true`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Estimate<T, F = FallbackEstimate> {
    Estimated(T),
    Fallback(F),
}

impl<T, F> Estimate<T, F> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Estimate::Fallback(_))
    }
}

/// Land rate from both providers for one request
#[derive(Debug, Clone, Serialize)]
pub struct LandRateComparison {
    pub gemini: Estimate<LandRateEstimate>,
    pub openai: Estimate<LandRateEstimate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrengthsAndRisks {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSummary {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub key_strengths: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub risks_to_monitor: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub timing: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub strategy: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub summary: String,
}

/// Investment recommendation produced with live web research
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRecommendation {
    #[serde(default)]
    pub property_analysis: StrengthsAndRisks,
    #[serde(default)]
    pub market_analysis: StrengthsAndRisks,
    #[serde(default)]
    pub investment_summary: InvestmentSummary,
}
