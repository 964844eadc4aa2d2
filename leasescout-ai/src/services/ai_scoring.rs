//! AI scoring pass over discovered tenants
//!
//! One batched OpenAI call scores every candidate. Scores are normalised
//! (numbers or numeric strings, clamped, default-filled) and merged back into
//! the heuristic candidates by exact company name. When the reply cannot be
//! parsed the heuristics are re-derived and substituted, so a parse error
//! never reaches the caller. Transport failures are returned to the caller.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::AnalysisError;
use crate::models::lenient::{number_from_value, strings_from_value, text_from_value};
use crate::models::{MarketAnalysis, Property, TenantCandidate};
use crate::services::ai_gateway::{AiGateway, CallOptions};
use crate::services::{prompts, scoring};
use crate::utils::parse_json_object;

const DEFAULT_SUB_SCORE: f64 = 5.0;
const DEFAULT_FINAL_SCORE: f64 = 50.0;
pub const MIN_AI_SCORE: f64 = 10.0;
pub const MAX_AI_SCORE: f64 = 100.0;

/// Token budget grows with the batch size
pub fn scoring_max_tokens(tenant_count: usize) -> u32 {
    (tenant_count as u32) * 200 + 500
}

/// One normalised entry of the scoring reply
#[derive(Debug, Clone, PartialEq)]
pub struct AiTenantScore {
    pub company: String,
    pub market_fit: f64,
    pub property_match: f64,
    pub growth_potential: f64,
    pub final_score: f64,
    pub reasoning: String,
    pub key_strengths: Vec<String>,
    pub risk_factors: Vec<String>,
}

fn clamped(raw: &Value, field: &str, default: f64, min: f64, max: f64) -> f64 {
    raw.get(field)
        .and_then(number_from_value)
        .filter(|n| *n != 0.0)
        .unwrap_or(default)
        .clamp(min, max)
}

/// Missing, null, false or "" take the default; an explicit `[]` stays empty
fn list_or(raw: &Value, field: &str, default: &[&str]) -> Vec<String> {
    match raw.get(field) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => {
            default.iter().map(|s| s.to_string()).collect()
        }
        Some(Value::String(s)) if s.is_empty() => default.iter().map(|s| s.to_string()).collect(),
        Some(value) => strings_from_value(value),
    }
}

/// Normalise one `tenantScores` entry
pub fn normalize_score(raw: &Value) -> AiTenantScore {
    let text = |field: &str| {
        raw.get(field)
            .and_then(text_from_value)
            .filter(|s| !s.trim().is_empty())
    };

    AiTenantScore {
        company: text("company").unwrap_or_else(|| "Unknown".to_string()),
        market_fit: clamped(raw, "marketFit", DEFAULT_SUB_SCORE, 1.0, 10.0),
        property_match: clamped(raw, "propertyMatch", DEFAULT_SUB_SCORE, 1.0, 10.0),
        growth_potential: clamped(raw, "growthPotential", DEFAULT_SUB_SCORE, 1.0, 10.0),
        final_score: clamped(raw, "finalScore", DEFAULT_FINAL_SCORE, MIN_AI_SCORE, MAX_AI_SCORE),
        reasoning: text("reasoning").unwrap_or_else(|| "AI analysis completed".to_string()),
        key_strengths: list_or(raw, "keyStrengths", &["Operational fit", "Market position"]),
        risk_factors: list_or(raw, "riskFactors", &["Market competition", "Economic factors"]),
    }
}

/// Parse a scoring reply; a reply without a `tenantScores` list is a parse error
pub fn parse_scores(text: &str) -> Result<Vec<AiTenantScore>, AnalysisError> {
    let document: Value = parse_json_object(text, "AI scoring")?;
    let entries = document
        .get("tenantScores")
        .and_then(Value::as_array)
        .ok_or_else(|| AnalysisError::Parse("AI scoring response has no tenantScores list".to_string()))?;

    Ok(entries.iter().map(normalize_score).collect())
}

/// Heuristic scores in the AI reply shape, used when the reply is unusable
pub fn fallback_scores(
    tenants: &[TenantCandidate],
    property: &Property,
    market: Option<&MarketAnalysis>,
) -> Vec<AiTenantScore> {
    let area_growth = MarketAnalysis::growth_score(market);

    tenants
        .iter()
        .map(|tenant| {
            let scores = scoring::score_tenant(tenant, property, area_growth);
            let size_fit = if scoring::capacity_match(tenant, property) >= 9.0 {
                "good"
            } else {
                "moderate"
            };
            let proximity = if scoring::distance_bonus(tenant) >= 7.0 {
                "excellent"
            } else {
                "adequate"
            };

            AiTenantScore {
                company: tenant.company.clone(),
                market_fit: scores.market_fit,
                property_match: scores.property_match,
                growth_potential: scores.growth_potential,
                final_score: scores.score,
                reasoning: format!(
                    "Algorithmic analysis: {} company with {} size compatibility and {} location proximity.",
                    tenant.industry_type, size_fit, proximity
                ),
                key_strengths: scoring::key_strengths(tenant, property),
                risk_factors: vec![
                    "Market competition".to_string(),
                    "Economic uncertainty".to_string(),
                ],
            }
        })
        .collect()
}

/// Overwrite matched candidates with AI scores, then stable re-sort by `score`
///
/// Matching is exact `company` equality; the first score entry for a name
/// wins. Unmatched candidates keep their heuristic scores. Returns the number
/// of candidates that received an AI score.
pub fn merge_scores(tenants: &mut [TenantCandidate], scores: &[AiTenantScore]) -> usize {
    let mut matched = 0;

    for tenant in tenants.iter_mut() {
        match scores.iter().find(|s| s.company == tenant.company) {
            Some(ai) => {
                tenant.market_fit = ai.market_fit;
                tenant.property_match = ai.property_match;
                tenant.growth_potential = ai.growth_potential;
                tenant.score = ai.final_score;
                tenant.ai_reasoning = Some(ai.reasoning.clone());
                tenant.key_strengths = ai.key_strengths.clone();
                tenant.risk_factors = ai.risk_factors.clone();
                matched += 1;
            }
            None => debug!(company = %tenant.company, "No AI score returned for tenant"),
        }
    }

    tenants.sort_by(|a, b| b.score.total_cmp(&a.score));
    matched
}

/// Score `tenants` with one batched OpenAI call
///
/// Transport failures are returned; unparseable replies fall back to the
/// algorithmic scores.
pub async fn score_with_ai(
    gateway: &AiGateway,
    tenants: &[TenantCandidate],
    property: &Property,
    market: Option<&MarketAnalysis>,
) -> Result<Vec<AiTenantScore>, AnalysisError> {
    if tenants.is_empty() {
        return Ok(Vec::new());
    }

    info!(tenants = tenants.len(), "Generating AI scores");

    let prompt = prompts::tenant_scoring(tenants, property, market);
    let options = CallOptions::new()
        .temperature(0.3)
        .max_tokens(scoring_max_tokens(tenants.len()));
    let reply = gateway.call_openai(&prompt, options).await?;

    let scores = match parse_scores(&reply) {
        Ok(scores) => scores,
        Err(e) => {
            warn!(error = %e, "AI scores unreadable, using algorithmic scores");
            fallback_scores(tenants, property, market)
        }
    };

    info!(scored = scores.len(), "AI scoring completed");
    Ok(scores)
}
