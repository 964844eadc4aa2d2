//! Market research payloads: nearby developments, cap rates, market overview

use serde::{Deserialize, Serialize};

use super::lenient;

/// A business development or investment near the property
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Development {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "lenient::string")]
    pub development_type: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub distance_from_subject: String,
    /// "positive" or "negative" as reported
    #[serde(default, deserialize_with = "lenient::string")]
    pub impact: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub investment_value: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub completion_date: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source: String,
}

/// A company moving operations into the area
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffshoringActivity {
    #[serde(default, deserialize_with = "lenient::string")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub activity: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub forecast_impact: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub timeline: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source: String,
}

/// Developments and growth status within 30 miles of the property
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentData {
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub region: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub analysis_date: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub growth_status: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub growth_summary: String,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub developments: Vec<Development>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub offshoring_activity: Vec<OffshoringActivity>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub development_summary: String,
}

/// Reported when development research is unavailable
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentFallback {
    pub growth_status: &'static str,
    pub growth_summary: &'static str,
    pub developments_count: usize,
    pub offshoring_count: usize,
    pub error: bool,
}

impl Default for DevelopmentFallback {
    fn default() -> Self {
        Self {
            growth_status: "Unknown",
            growth_summary: "No data available",
            developments_count: 0,
            offshoring_count: 0,
            error: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabeledRange {
    #[serde(default, deserialize_with = "lenient::string")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub range: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectProperty {
    #[serde(default, deserialize_with = "lenient::string")]
    pub location_notes: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub classification: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub expected_cap_rate_range: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableSale {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub size: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub cap_rate_range: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapRateRecommendation {
    #[serde(default, deserialize_with = "lenient::string")]
    pub target_cap_rate_range: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub justification: Vec<String>,
}

/// Market cap rates around the property, with comparable sales
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapRateAnalysis {
    #[serde(default, deserialize_with = "lenient::string")]
    pub region: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub year: Option<f64>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub market_averages: Vec<LabeledRange>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub subject_property: SubjectProperty,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub market_context: Vec<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub comparable_sales: Vec<ComparableSale>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub investment_recommendation: CapRateRecommendation,
}

/// Reference cap-rate analysis (Baltimore industrial, 2024) served when live
/// research fails; `error` tells clients it is not about their property
#[derive(Debug, Clone, Serialize)]
pub struct CapRateFallback {
    #[serde(flatten)]
    pub analysis: CapRateAnalysis,
    pub error: bool,
}

fn ranges(items: &[(&str, &str)]) -> Vec<LabeledRange> {
    items
        .iter()
        .map(|(label, range)| LabeledRange {
            label: label.to_string(),
            range: range.to_string(),
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sale(name: &str, size: &str, location: &str, cap_rate_range: &str) -> ComparableSale {
    ComparableSale {
        name: name.to_string(),
        size: size.to_string(),
        location: location.to_string(),
        cap_rate_range: cap_rate_range.to_string(),
        source: "CBRE".to_string(),
    }
}

impl Default for CapRateFallback {
    fn default() -> Self {
        let analysis = CapRateAnalysis {
            region: "Baltimore".to_string(),
            year: Some(2024.0),
            market_averages: ranges(&[
                ("Overall Market", "6.0% – 8.5%"),
                ("Prime Locations (BWI/Port)", "6.0% – 7.5%"),
                ("Secondary Locations", "7.5% – 8.5%"),
                ("Value-Add Properties", "8.0% – 9.5%"),
            ]),
            subject_property: SubjectProperty {
                location_notes: "Near BWI Airport (4.6 mi), Port of Baltimore (3.9 mi), and major highway access."
                    .to_string(),
                classification: "Prime Industrial Location".to_string(),
                expected_cap_rate_range: "7.0% – 8.0%".to_string(),
            },
            market_context: strings(&[
                "Cap rates have compressed significantly from 2020 levels due to strong demand.",
                "CBRE reported 6% cap rate compression in the Baltimore industrial market through 2024.",
                "The Francis Scott Key Bridge collapse may add 25–50 basis points to cap rates in affected areas.",
                "Limited supply of large industrial parcels (8+ acres) commands premium pricing.",
            ]),
            comparable_sales: vec![
                sale("Race Road Logistics Center", "130,000 SF", "Hanover", "6.5% – 7.0%"),
                sale("Peppermill Trade Center", "107,000 SF", "Glen Burnie", "6.8% – 7.3%"),
            ],
            investment_recommendation: CapRateRecommendation {
                target_cap_rate_range: "7.5% – 8.0%".to_string(),
                justification: strings(&[
                    "Excellent location fundamentals",
                    "Large parcel size (rare in the market)",
                    "Value-add potential",
                    "Favorable market conditions",
                ]),
            },
        };
        Self { analysis, error: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EconomicOutlook {
    /// "Boom", "Growing", "Slowing" or "Stagnant"
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcedValue {
    #[serde(default, deserialize_with = "lenient::string")]
    pub value: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateRange {
    #[serde(default, deserialize_with = "lenient::string")]
    pub average: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub range: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseRates {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub building_rate: RateRange,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub ios_land_rate: RateRange,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxIncentive {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source: String,
}

/// Economic outlook, vacancy, absorption, lease and cap rates, incentives
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
    #[serde(default, deserialize_with = "lenient::string")]
    pub region: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub year: Option<f64>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub economic_outlook: EconomicOutlook,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub vacancy_rate: SourcedValue,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub absorption_rate: SourcedValue,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub lease_rates: LeaseRates,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub cap_rates: RateRange,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub tax_incentives: Vec<TaxIncentive>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub market_summary: String,
}

/// Reported when the market overview is unavailable
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewFallback {
    pub economic_outlook: OutlookUnknown,
    pub market_summary: &'static str,
    pub error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlookUnknown {
    pub status: &'static str,
    pub description: &'static str,
}

impl Default for OverviewFallback {
    fn default() -> Self {
        Self {
            economic_outlook: OutlookUnknown {
                status: "Unknown",
                description: "No data available",
            },
            market_summary: "No data available",
            error: true,
        }
    }
}
