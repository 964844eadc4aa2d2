//! Tunable tenant discovery parameters
//!
//! Field names are snake_case on the wire; clients read and patch this
//! object through `/api/config/prompt`.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

pub const MIN_RESULT_COUNT: u32 = 1;
pub const MAX_RESULT_COUNT: u32 = 50;

/// Discovery and ranking parameters, snapshotted once per analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    pub focus: String,
    pub discovery_strategy: String,
    pub exclude_companies: Vec<String>,
    pub target_types: Vec<String>,
    pub search_radius_miles: u32,
    pub result_count: u32,
    pub ranking_criteria: Vec<String>,
    pub tone: String,
    pub preferred_company_size: String,
    pub focus_industries: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            focus: "AI-driven building configuration analysis, discover emerging companies \
                    (non-Fortune 500 tenants) based on property characteristics and area \
                    economic trends"
                .to_string(),
            discovery_strategy: "emerging_scaling_companies".to_string(),
            exclude_companies: strings(&[
                "Amazon",
                "Walmart",
                "FedEx",
                "UPS",
                "Home Depot",
                "Lowe's",
            ]),
            target_types: strings(&[
                "Regional 3PL providers",
                "Growing food distributors",
                "Emerging manufacturers",
                "Tech companies needing warehouses",
                "Regional retail distributors",
                "Specialty logistics providers",
            ]),
            search_radius_miles: 100,
            result_count: 20,
            ranking_criteria: strings(&[
                "area_growth_trends",
                "operational_needs_match",
                "capacity_requirements",
                "industry_growth",
                "building_fit",
            ]),
            tone: "analytical, data-driven, precise".to_string(),
            preferred_company_size: "emerging_to_midsize".to_string(),
            focus_industries: strings(&["3PL", "Manufacturing", "Food", "Tech", "Retail"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(MIN_RESULT_COUNT..=MAX_RESULT_COUNT).contains(&self.result_count) {
            return Err(AnalysisError::Validation(format!(
                "result_count must be between {} and {}",
                MIN_RESULT_COUNT, MAX_RESULT_COUNT
            )));
        }
        if self.search_radius_miles == 0 {
            return Err(AnalysisError::Validation(
                "search_radius_miles must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of candidates requested from the discovery call
    pub fn discovery_count(&self) -> u32 {
        self.result_count.max(20)
    }

    pub fn targets_emerging_companies(&self) -> bool {
        self.discovery_strategy == "emerging_scaling_companies"
    }
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoveryConfigPatch {
    pub focus: Option<String>,
    pub discovery_strategy: Option<String>,
    pub exclude_companies: Option<Vec<String>>,
    pub target_types: Option<Vec<String>>,
    pub search_radius_miles: Option<u32>,
    pub result_count: Option<u32>,
    pub ranking_criteria: Option<Vec<String>>,
    pub tone: Option<String>,
    pub preferred_company_size: Option<String>,
    pub focus_industries: Option<Vec<String>>,
}

impl DiscoveryConfigPatch {
    /// Apply onto a copy of `base`, validating the merged result
    pub fn apply(self, base: &DiscoveryConfig) -> Result<DiscoveryConfig, AnalysisError> {
        let DiscoveryConfigPatch {
            focus,
            discovery_strategy,
            exclude_companies,
            target_types,
            search_radius_miles,
            result_count,
            ranking_criteria,
            tone,
            preferred_company_size,
            focus_industries,
        } = self;
        let base = base.clone();

        let merged = DiscoveryConfig {
            focus: focus.unwrap_or(base.focus),
            discovery_strategy: discovery_strategy.unwrap_or(base.discovery_strategy),
            exclude_companies: exclude_companies.unwrap_or(base.exclude_companies),
            target_types: target_types.unwrap_or(base.target_types),
            search_radius_miles: search_radius_miles.unwrap_or(base.search_radius_miles),
            result_count: result_count.unwrap_or(base.result_count),
            ranking_criteria: ranking_criteria.unwrap_or(base.ranking_criteria),
            tone: tone.unwrap_or(base.tone),
            preferred_company_size: preferred_company_size
                .unwrap_or(base.preferred_company_size),
            focus_industries: focus_industries.unwrap_or(base.focus_industries),
        };

        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DiscoveryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search_radius_miles, 100);
        assert_eq!(config.result_count, 20);
        assert_eq!(config.discovery_count(), 20);
        assert!(config.targets_emerging_companies());
    }

    #[test]
    fn test_patch_merges_fields() {
        let patch: DiscoveryConfigPatch =
            serde_json::from_str(r#"{"result_count": 30, "tone": "concise"}"#).unwrap();
        let merged = patch.apply(&DiscoveryConfig::default()).unwrap();

        assert_eq!(merged.result_count, 30);
        assert_eq!(merged.discovery_count(), 30);
        assert_eq!(merged.tone, "concise");
        assert_eq!(merged.search_radius_miles, 100);
    }

    #[test]
    fn test_patch_rejects_out_of_range_count() {
        for count in [0, 51] {
            let patch = DiscoveryConfigPatch {
                result_count: Some(count),
                ..Default::default()
            };
            assert!(matches!(
                patch.apply(&DiscoveryConfig::default()),
                Err(AnalysisError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_patch_rejects_unknown_field() {
        let result: Result<DiscoveryConfigPatch, _> =
            serde_json::from_str(r#"{"result_cont": 5}"#);
        assert!(result.is_err());
    }
}
