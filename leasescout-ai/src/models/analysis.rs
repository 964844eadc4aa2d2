//! Stage outputs and the analysis result envelope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;
use super::tenant::TenantCandidate;

pub const PROMPT_VERSION: &str = "leasescout_v2.0";
pub const FOCUS_STRATEGY: &str = "emerging_companies";

/// Area growth score used when market analysis is missing
pub const DEFAULT_AREA_GROWTH_SCORE: f64 = 7.0;

/// Pipeline stages, numbered as reported to the progress tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    BuildingConfiguration,
    MarketTrends,
    TenantDiscovery,
    AiScoring,
}

impl AnalysisStage {
    pub fn step(&self) -> u32 {
        match self {
            AnalysisStage::BuildingConfiguration => 1,
            AnalysisStage::MarketTrends => 2,
            AnalysisStage::TenantDiscovery => 3,
            AnalysisStage::AiScoring => 4,
        }
    }

    pub fn task(&self) -> &'static str {
        match self {
            AnalysisStage::BuildingConfiguration => "Building configuration analysis",
            AnalysisStage::MarketTrends => "Growth trends analysis",
            AnalysisStage::TenantDiscovery => "Emerging tenant search",
            AnalysisStage::AiScoring => "AI tenant scoring",
        }
    }

    pub fn details(&self) -> &'static str {
        match self {
            AnalysisStage::BuildingConfiguration => {
                "Using the Gemini API to analyze property characteristics..."
            }
            AnalysisStage::MarketTrends => {
                "Using the OpenAI API to analyze the local market and economic trends..."
            }
            AnalysisStage::TenantDiscovery => {
                "Using the OpenAI API to discover emerging businesses..."
            }
            AnalysisStage::AiScoring => {
                "Generating advanced scores using artificial intelligence..."
            }
        }
    }

    /// Message recorded in the error map when the stage degrades
    pub fn failure_message(&self) -> &'static str {
        match self {
            AnalysisStage::BuildingConfiguration => {
                "Error during building configuration analysis"
            }
            AnalysisStage::MarketTrends => "Error during market trends analysis",
            AnalysisStage::TenantDiscovery => "Error during tenant discovery",
            AnalysisStage::AiScoring => "Error during AI tenant scoring; heuristic scores kept",
        }
    }
}

/// Stage 1 output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingAnalysis {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub configuration: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub property_features: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub key_features: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub brief_property_info: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub market_fit: Option<String>,
    #[serde(default)]
    pub technical_specs: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub target_use_types: Vec<String>,
}

/// Stage 2 output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub area_growth_trends: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub national_industry_trend: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub booming_industry: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub recent_real_estate_news: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub local_trends: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub industry_growth: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub area_growth_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub demand_indicators: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub competitive_factors: Vec<String>,
}

impl MarketAnalysis {
    /// Area growth score clamped to [1, 10]; missing or non-positive → 7
    pub fn growth_score(market: Option<&MarketAnalysis>) -> f64 {
        market
            .and_then(|m| m.area_growth_score)
            .filter(|s| *s > 0.0)
            .unwrap_or(DEFAULT_AREA_GROWTH_SCORE)
            .clamp(1.0, 10.0)
    }
}

/// Per-stage degradation messages; empty when every stage succeeded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_ranking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_scoring: Option<String>,
}

impl StageErrors {
    pub fn record(&mut self, stage: AnalysisStage) {
        let slot = match stage {
            AnalysisStage::BuildingConfiguration => &mut self.property_analysis,
            AnalysisStage::MarketTrends => &mut self.market_analysis,
            AnalysisStage::TenantDiscovery => &mut self.tenant_ranking,
            AnalysisStage::AiScoring => &mut self.ai_scoring,
        };
        *slot = Some(stage.failure_message().to_string());
    }

    pub fn count(&self) -> usize {
        [
            &self.property_analysis,
            &self.market_analysis,
            &self.tenant_ranking,
            &self.ai_scoring,
        ]
        .iter()
        .filter(|e| e.is_some())
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Property section of the envelope, with display defaults filled in
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyAnalysisView {
    pub configuration: Option<String>,
    pub market_fit: String,
    pub key_features: String,
    pub property_features: Vec<String>,
    pub brief_property_info: String,
}

impl From<Option<&BuildingAnalysis>> for PropertyAnalysisView {
    fn from(analysis: Option<&BuildingAnalysis>) -> Self {
        let analysis = analysis.cloned().unwrap_or_default();
        let key_features = analysis
            .key_features
            .clone()
            .or_else(|| {
                (!analysis.property_features.is_empty())
                    .then(|| analysis.property_features.join(", "))
            })
            .unwrap_or_else(|| "Standard industrial features".to_string());

        Self {
            configuration: analysis.configuration,
            market_fit: analysis
                .market_fit
                .unwrap_or_else(|| "Property suited to industrial needs".to_string()),
            key_features,
            property_features: analysis.property_features,
            brief_property_info: analysis.brief_property_info.unwrap_or_default(),
        }
    }
}

/// Market section of the envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketContext {
    pub local_trends: Option<String>,
    pub industry_growth: Option<String>,
    pub area_growth_score: f64,
    pub demand_indicators: Vec<String>,
    pub area_growth_trends: Option<String>,
    pub national_industry_trend: Option<String>,
    pub booming_industry: Option<String>,
    pub recent_real_estate_news: Option<String>,
    pub competitive_factors: Vec<String>,
}

impl From<Option<&MarketAnalysis>> for MarketContext {
    fn from(market: Option<&MarketAnalysis>) -> Self {
        let area_growth_score = MarketAnalysis::growth_score(market);
        let market = market.cloned().unwrap_or_default();
        let demand_indicators = if market.demand_indicators.is_empty() {
            vec!["Industrial growth".to_string(), "Logistics demand".to_string()]
        } else {
            market.demand_indicators
        };

        Self {
            local_trends: market.local_trends.or_else(|| market.area_growth_trends.clone()),
            industry_growth: market
                .industry_growth
                .or_else(|| market.national_industry_trend.clone()),
            area_growth_score,
            demand_indicators,
            area_growth_trends: market.area_growth_trends,
            national_industry_trend: market.national_industry_trend,
            booming_industry: market.booming_industry,
            recent_real_estate_news: market.recent_real_estate_news,
            competitive_factors: market.competitive_factors,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub analysis_date: DateTime<Utc>,
    pub prompt_version: String,
    pub focus_strategy: String,
    pub discovery_strategy: String,
    pub ai_scoring_enabled: bool,
    /// Same count the progress tracker declares for the session
    pub total_steps: u32,
    pub candidates_discovered: usize,
    pub total_candidates_analyzed: usize,
    pub ranking_criteria: Vec<String>,
    pub tenants_with_ai_scoring: usize,
    pub has_errors: bool,
}

/// Result envelope of one analysis run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub property_analysis: PropertyAnalysisView,
    pub market_context: MarketContext,
    pub tenant_ranking: Vec<TenantCandidate>,
    pub errors: StageErrors,
    pub metadata: AnalysisMetadata,
}

/// Total steps for a session with or without the AI scoring stage
pub fn total_steps(use_ai_scoring: bool) -> u32 {
    if use_ai_scoring {
        4
    } else {
        3
    }
}
