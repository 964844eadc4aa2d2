//! Candidate tenant records

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::lenient;

/// Industry a candidate operates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndustryType {
    #[serde(rename = "3PL")]
    ThirdPartyLogistics,
    Manufacturing,
    Food,
    Tech,
    Retail,
    #[default]
    #[serde(other)]
    Other,
}

impl IndustryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndustryType::ThirdPartyLogistics => "3PL",
            IndustryType::Manufacturing => "Manufacturing",
            IndustryType::Food => "Food",
            IndustryType::Tech => "Tech",
            IndustryType::Retail => "Retail",
            IndustryType::Other => "Other",
        }
    }
}

impl fmt::Display for IndustryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of space the candidate would lease
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitType {
    WarehouseSpace,
    OfficeSpace,
    MixedUse,
    #[default]
    #[serde(other)]
    Other,
}

impl BenefitType {
    /// Human-readable label ("warehouse space")
    pub fn label(&self) -> &'static str {
        match self {
            BenefitType::WarehouseSpace => "warehouse space",
            BenefitType::OfficeSpace => "office space",
            BenefitType::MixedUse => "mixed use",
            BenefitType::Other => "industrial space",
        }
    }
}

/// A discovered tenant, enriched and scored in place by the pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantCandidate {
    #[serde(default, deserialize_with = "lenient::string")]
    pub company: String,

    #[serde(
        rename = "contact_info",
        alias = "contactInfo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_info: Option<Value>,

    #[serde(default, deserialize_with = "lenient::string")]
    pub operations: String,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub industry_type: IndustryType,

    #[serde(default, deserialize_with = "lenient::string")]
    pub nearby_location: String,

    /// Miles from the property, as reported ("12", "12 miles")
    #[serde(default, deserialize_with = "lenient::string")]
    pub distance: String,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub benefit_type: BenefitType,

    // Everything below is derived locally; model-supplied values are ignored

    // Enrichment (1-10)
    #[serde(skip_deserializing)]
    pub strategic_fit: u32,
    #[serde(skip_deserializing)]
    pub market_timing: u32,
    #[serde(skip_deserializing)]
    pub competitive_pressure: u32,

    #[serde(skip_deserializing)]
    pub benefit_paragraph: String,

    // Sub-scores (1-10) and the authoritative ranking score (1-100)
    #[serde(skip_deserializing)]
    pub market_fit: f64,
    #[serde(skip_deserializing)]
    pub property_match: f64,
    #[serde(skip_deserializing)]
    pub growth_potential: f64,
    #[serde(skip_deserializing)]
    pub score: f64,

    #[serde(skip_deserializing)]
    pub ai_reasoning: Option<String>,
    #[serde(skip_deserializing)]
    pub key_strengths: Vec<String>,
    #[serde(skip_deserializing)]
    pub risk_factors: Vec<String>,
}

impl TenantCandidate {
    /// Leading integer of `distance`, if any
    pub fn distance_miles(&self) -> Option<i64> {
        lenient::leading_integer(&self.distance)
    }

    pub fn operations_mention(&self, keywords: &[&str]) -> bool {
        let operations = self.operations.to_lowercase();
        keywords.iter().any(|k| operations.contains(k))
    }
}
