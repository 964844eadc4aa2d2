//! Property input as submitted by callers, and its validated form

use serde::{Deserialize, Serialize};

use super::lenient;
use crate::error::AnalysisError;

/// Raw `propertyData` object from an analysis request
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInput {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub address: Option<String>,

    #[serde(rename = "type", default, deserialize_with = "lenient::opt_string")]
    pub property_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub square_footage: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub acreage: Option<f64>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub features: Vec<String>,

    #[serde(rename = "use_ai_scoring", alias = "useAiScoring", default)]
    pub use_ai_scoring: bool,
}

/// Property that passed boundary validation
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub address: String,
    pub property_type: String,
    /// Building area in square feet (0 when unknown)
    pub square_footage: f64,
    pub acreage: Option<f64>,
    pub features: Vec<String>,
    pub use_ai_scoring: bool,
}

impl PropertyInput {
    /// Check required fields; runs before any provider call or session creation
    pub fn validate(self) -> Result<Property, AnalysisError> {
        let address = non_blank(self.address);
        let property_type = non_blank(self.property_type);

        let mut missing = Vec::new();
        if address.is_none() {
            missing.push("propertyData.address");
        }
        if property_type.is_none() {
            missing.push("propertyData.type");
        }

        match (address, property_type) {
            (Some(address), Some(property_type)) => Ok(Property {
                address,
                property_type,
                square_footage: self.square_footage.filter(|s| *s > 0.0).unwrap_or(0.0),
                acreage: self.acreage,
                features: self.features,
                use_ai_scoring: self.use_ai_scoring,
            }),
            _ => Err(AnalysisError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Property {
    pub fn is_type(&self, property_type: &str) -> bool {
        self.property_type.eq_ignore_ascii_case(property_type)
    }

    /// Any feature mentions `needle` (case-insensitive)
    pub fn has_feature(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.features
            .iter()
            .any(|f| f.to_lowercase().contains(&needle))
    }

    /// Features joined for prompts, or `fallback` when none were given
    pub fn features_or(&self, fallback: &str) -> String {
        if self.features.is_empty() {
            fallback.to_string()
        } else {
            self.features.join(", ")
        }
    }
}
