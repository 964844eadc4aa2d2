//! Heuristic tenant scoring
//!
//! Pure functions over a candidate, the validated property and the market
//! growth score. Everything here is deterministic: the same inputs always
//! produce the same scores.
//!
//! - `marketFit`: area growth, industry growth and a per-company variation
//! - `propertyMatch`: operational match, building fit and a distance bonus
//! - `growthPotential`: capacity match, market timing and competitive pressure
//! - `score`: weighted composite on a 100-point scale, clamped to [15, 95]

use crate::models::{IndustryType, MarketAnalysis, Property, TenantCandidate};
use crate::models::tenant::BenefitType;

const MARKET_FIT_WEIGHT: f64 = 0.35;
const PROPERTY_MATCH_WEIGHT: f64 = 0.40;
const GROWTH_POTENTIAL_WEIGHT: f64 = 0.25;

pub const MIN_HEURISTIC_SCORE: f64 = 15.0;
pub const MAX_HEURISTIC_SCORE: f64 = 95.0;

/// Distance assumed when a candidate's distance cannot be read
const UNKNOWN_DISTANCE_MILES: i64 = 50;

/// Sub-scores and composite for one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TenantScores {
    pub market_fit: f64,
    pub property_match: f64,
    pub growth_potential: f64,
    pub score: f64,
}

fn average_score(parts: [f64; 3]) -> f64 {
    (parts.iter().sum::<f64>() / 3.0).round().clamp(1.0, 10.0)
}

fn distance_or_default(tenant: &TenantCandidate) -> i64 {
    tenant.distance_miles().unwrap_or(UNKNOWN_DISTANCE_MILES)
}

pub fn industry_growth(industry: IndustryType) -> f64 {
    match industry {
        IndustryType::ThirdPartyLogistics => 9.0,
        IndustryType::Tech => 10.0,
        IndustryType::Food => 6.0,
        IndustryType::Manufacturing => 5.0,
        IndustryType::Retail => 4.0,
        IndustryType::Other => 5.0,
    }
}

/// Small name-derived spread so equal candidates do not tie
pub fn company_variation(company: &str) -> f64 {
    (company.chars().count() % 3) as f64 + 1.0
}

pub fn distance_bonus(tenant: &TenantCandidate) -> f64 {
    match distance_or_default(tenant) {
        d if d <= 15 => 9.0,
        d if d <= 30 => 7.0,
        d if d <= 50 => 5.0,
        d if d <= 75 => 3.0,
        _ => 1.0,
    }
}

/// Fit between a company's known footprint and the property type
pub fn operational_match(company: &str, property: &Property) -> f64 {
    let company = company.to_lowercase();
    let mut score: f64 = 5.0;

    if company.contains("amazon") || company.contains("fedex") {
        if property.is_type("warehouse") {
            score += 2.0;
        }
        if property.square_footage > 50_000.0 {
            score += 1.0;
        }
    }

    if company.contains("walmart") || company.contains("sysco") {
        if property.is_type("cold-storage") {
            score += 3.0;
        }
        if property.square_footage > 25_000.0 {
            score += 1.0;
        }
    }

    score.min(10.0)
}

pub fn building_fit(tenant: &TenantCandidate, property: &Property) -> f64 {
    let size = property.square_footage;
    let mut score: f64 = 2.0;

    score += match tenant.benefit_type {
        BenefitType::WarehouseSpace if property.is_type("warehouse") => 5.0,
        BenefitType::MixedUse => 3.0,
        BenefitType::OfficeSpace if property.is_type("warehouse") => 1.0,
        _ => 0.0,
    };

    score += if (100_000.0..=200_000.0).contains(&size) {
        3.0
    } else if (50_000.0..=300_000.0).contains(&size) {
        2.0
    } else if (25_000.0..=500_000.0).contains(&size) {
        1.0
    } else {
        0.0
    };

    match tenant.industry_type {
        IndustryType::ThirdPartyLogistics if size >= 100_000.0 => score += 2.0,
        IndustryType::Food if property.has_feature("cold") => score += 3.0,
        IndustryType::Manufacturing if size >= 75_000.0 => score += 2.0,
        _ => {}
    }

    score.min(10.0)
}

/// Ideal building size range (sq ft) per industry
pub fn ideal_size_range(industry: IndustryType) -> (f64, f64) {
    match industry {
        IndustryType::ThirdPartyLogistics => (50_000.0, 300_000.0),
        IndustryType::Manufacturing => (25_000.0, 200_000.0),
        IndustryType::Food => (30_000.0, 150_000.0),
        IndustryType::Tech => (20_000.0, 100_000.0),
        IndustryType::Retail => (40_000.0, 250_000.0),
        IndustryType::Other => (30_000.0, 200_000.0),
    }
}

/// 9 inside the ideal range, 7 within 70%-130% of it, 5 otherwise
pub fn capacity_match(tenant: &TenantCandidate, property: &Property) -> f64 {
    let (min, max) = ideal_size_range(tenant.industry_type);
    let size = property.square_footage;

    if (min..=max).contains(&size) {
        9.0
    } else if (min * 0.7..=max * 1.3).contains(&size) {
        7.0
    } else {
        5.0
    }
}

pub fn market_timing(tenant: &TenantCandidate, area_growth: f64) -> u32 {
    let mut score = 4;

    score += match area_growth {
        g if g >= 8.0 => 4,
        g if g >= 6.0 => 2,
        g if g >= 4.0 => 1,
        _ => 0,
    };

    score += match tenant.industry_type {
        IndustryType::ThirdPartyLogistics => 2,
        IndustryType::Tech => 3,
        IndustryType::Food => 1,
        _ => 0,
    };

    if tenant.nearby_location.to_lowercase().contains("hub") {
        score += 1;
    }

    score.min(10)
}

/// Higher for crowded sectors, specialised operations and close competitors
pub fn competitive_pressure(tenant: &TenantCandidate) -> u32 {
    let mut score = 3;

    score += match tenant.industry_type {
        IndustryType::ThirdPartyLogistics => 3,
        IndustryType::Tech => 4,
        IndustryType::Food => 2,
        IndustryType::Manufacturing => 1,
        _ => 0,
    };

    if tenant.operations_mention(&["distribution", "logistics"]) {
        score += 2;
    }
    if tenant.operations_mention(&["manufacturing", "assembly"]) {
        score += 1;
    }
    if tenant.operations_mention(&["tech", "software"]) {
        score += 3;
    }

    match distance_or_default(tenant) {
        d if d < 20 => score += 2,
        d if d < 40 => score += 1,
        _ => {}
    }

    score.min(10)
}

/// Proximity-only fit; no bonus when the distance is unreadable
pub fn strategic_fit(tenant: &TenantCandidate) -> u32 {
    let mut score = 5;
    match tenant.distance_miles() {
        Some(d) if d < 50 => score += 2,
        Some(d) if d < 100 => score += 1,
        _ => {}
    }
    score.min(10)
}

/// Weighted composite on a 100-point scale, clamped to [15, 95]
pub fn composite_score(market_fit: f64, property_match: f64, growth_potential: f64) -> f64 {
    let weighted = market_fit * MARKET_FIT_WEIGHT
        + property_match * PROPERTY_MATCH_WEIGHT
        + growth_potential * GROWTH_POTENTIAL_WEIGHT;
    (weighted * 10.0)
        .round()
        .clamp(MIN_HEURISTIC_SCORE, MAX_HEURISTIC_SCORE)
}

pub fn score_tenant(tenant: &TenantCandidate, property: &Property, area_growth: f64) -> TenantScores {
    let market_fit = average_score([
        area_growth.clamp(1.0, 10.0),
        industry_growth(tenant.industry_type),
        company_variation(&tenant.company),
    ]);

    let property_match = average_score([
        operational_match(&tenant.company, property),
        building_fit(tenant, property),
        distance_bonus(tenant),
    ]);

    let growth_potential = average_score([
        capacity_match(tenant, property),
        market_timing(tenant, area_growth) as f64,
        competitive_pressure(tenant) as f64,
    ]);

    TenantScores {
        market_fit,
        property_match,
        growth_potential,
        score: composite_score(market_fit, property_match, growth_potential),
    }
}

/// Value proposition shown with each ranked candidate
pub fn benefit_paragraph(
    tenant: &TenantCandidate,
    property: &Property,
    market: Option<&MarketAnalysis>,
) -> String {
    let features = if property.features.is_empty() {
        "modern facilities".to_string()
    } else {
        property
            .features
            .iter()
            .take(2)
            .cloned()
            .collect::<Vec<_>>()
            .join(" and ")
    };
    let area_growth = market
        .and_then(|m| m.area_growth_trends.as_deref())
        .unwrap_or("positive economic trends");
    let national_trend = market
        .and_then(|m| m.national_industry_trend.as_deref())
        .unwrap_or("industry growth");

    format!(
        "The property at {} benefits {} by offering {} sq ft of {} with {}, addressing \
         operational needs near {}. With {} and {}, it provides operational advantages and \
         strategic positioning for the company's next phase of growth.",
        property.address,
        tenant.company,
        property.square_footage,
        tenant.benefit_type.label(),
        features,
        tenant.nearby_location,
        area_growth,
        national_trend,
    )
}

/// Attach enrichment, heuristic scores and the benefit paragraph in place
pub fn enrich(tenant: &mut TenantCandidate, property: &Property, market: Option<&MarketAnalysis>) {
    let area_growth = MarketAnalysis::growth_score(market);

    tenant.strategic_fit = strategic_fit(tenant);
    tenant.market_timing = market_timing(tenant, area_growth);
    tenant.competitive_pressure = competitive_pressure(tenant);

    let scores = score_tenant(tenant, property, area_growth);
    tenant.market_fit = scores.market_fit;
    tenant.property_match = scores.property_match;
    tenant.growth_potential = scores.growth_potential;
    tenant.score = scores.score;

    tenant.benefit_paragraph = benefit_paragraph(tenant, property, market);
}

/// Stable sort by `score` descending, then keep the first `limit`
pub fn rank_tenants(tenants: &mut Vec<TenantCandidate>, limit: usize) {
    tenants.sort_by(|a, b| b.score.total_cmp(&a.score));
    tenants.truncate(limit);
}

/// Strengths derived from industry, distance and building size (at most 3)
pub fn key_strengths(tenant: &TenantCandidate, property: &Property) -> Vec<String> {
    let mut strengths = vec!["Market position"];

    match tenant.industry_type {
        IndustryType::ThirdPartyLogistics => strengths.push("Logistics expertise"),
        IndustryType::Tech => strengths.push("Innovation capacity"),
        _ => {}
    }
    if tenant.distance_miles().is_some_and(|d| d <= 30) {
        strengths.push("Strategic location");
    }
    if property.square_footage >= 100_000.0 {
        strengths.push("Scale operations");
    }

    strengths.into_iter().take(3).map(str::to_string).collect()
}
