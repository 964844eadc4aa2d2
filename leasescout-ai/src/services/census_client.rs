//! U.S. Census Bureau lookups
//!
//! Demographics come from the ACS 5-year state tables, industrial data from
//! County Business Patterns (CBP) and the Quarterly Workforce Indicators
//! (QWI). Unemployment is a static per-state table.
//!
//! Census replies are row-major JSON arrays: row 0 holds the column names,
//! row 1 the values (as strings).

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::models::lenient::{leading_integer, leading_number};

const CENSUS_API_BASE: &str = "https://api.census.gov/data";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_UNEMPLOYMENT_RATE: f64 = 3.5;
const QWI_QUARTER: &str = "2024-Q1";

/// NAICS sectors queried from County Business Patterns
const CBP_SECTORS: [&str; 6] = ["48", "49", "31", "32", "33", "493"];

/// (code, name, FIPS, unemployment rate %)
const STATES: [(&str, &str, &str, f64); 50] = [
    ("AL", "Alabama", "01", 2.8),
    ("AK", "Alaska", "02", 4.2),
    ("AZ", "Arizona", "04", 3.5),
    ("AR", "Arkansas", "05", 3.1),
    ("CA", "California", "06", 4.1),
    ("CO", "Colorado", "08", 3.2),
    ("CT", "Connecticut", "09", 3.8),
    ("DE", "Delaware", "10", 4.0),
    ("FL", "Florida", "12", 2.8),
    ("GA", "Georgia", "13", 3.1),
    ("HI", "Hawaii", "15", 2.9),
    ("ID", "Idaho", "16", 2.3),
    ("IL", "Illinois", "17", 4.5),
    ("IN", "Indiana", "18", 2.8),
    ("IA", "Iowa", "19", 2.7),
    ("KS", "Kansas", "20", 2.8),
    ("KY", "Kentucky", "21", 3.9),
    ("LA", "Louisiana", "22", 3.8),
    ("ME", "Maine", "23", 2.8),
    ("MD", "Maryland", "24", 3.5),
    ("MA", "Massachusetts", "25", 3.0),
    ("MI", "Michigan", "26", 3.8),
    ("MN", "Minnesota", "27", 2.9),
    ("MS", "Mississippi", "28", 3.8),
    ("MO", "Missouri", "29", 3.2),
    ("MT", "Montana", "30", 2.5),
    ("NE", "Nebraska", "31", 2.1),
    ("NV", "Nevada", "32", 4.1),
    ("NH", "New Hampshire", "33", 2.1),
    ("NJ", "New Jersey", "34", 4.0),
    ("NM", "New Mexico", "35", 4.8),
    ("NY", "New York", "36", 4.1),
    ("NC", "North Carolina", "37", 3.4),
    ("ND", "North Dakota", "38", 2.0),
    ("OH", "Ohio", "39", 3.5),
    ("OK", "Oklahoma", "40", 3.1),
    ("OR", "Oregon", "41", 3.8),
    ("PA", "Pennsylvania", "42", 3.4),
    ("RI", "Rhode Island", "44", 3.2),
    ("SC", "South Carolina", "45", 3.0),
    ("SD", "South Dakota", "46", 2.1),
    ("TN", "Tennessee", "47", 3.2),
    ("TX", "Texas", "48", 3.8),
    ("UT", "Utah", "49", 2.9),
    ("VT", "Vermont", "50", 2.2),
    ("VA", "Virginia", "51", 2.9),
    ("WA", "Washington", "53", 4.0),
    ("WV", "West Virginia", "54", 3.5),
    ("WI", "Wisconsin", "55", 2.8),
    ("WY", "Wyoming", "56", 3.4),
];

pub fn state_fips(code: &str) -> Option<&'static str> {
    STATES.iter().find(|s| s.0 == code).map(|s| s.2)
}

pub fn state_code_for_name(name: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|s| s.1.eq_ignore_ascii_case(name))
        .map(|s| s.0)
}

/// Static unemployment rate; 3.5 for unknown codes
pub fn unemployment_rate(code: &str) -> f64 {
    STATES
        .iter()
        .find(|s| s.0 == code)
        .map(|s| s.3)
        .unwrap_or(DEFAULT_UNEMPLOYMENT_RATE)
}

#[derive(Debug, Error)]
pub enum CensusError {
    #[error("Could not parse address: {0}")]
    UnparseableAddress(String),

    #[error("Unknown state code: {0}")]
    UnknownState(String),

    #[error("Census request failed: {0}")]
    Request(String),
}

impl From<CensusError> for ApiError {
    fn from(err: CensusError) -> Self {
        match err {
            CensusError::UnparseableAddress(_) | CensusError::UnknownState(_) => {
                ApiError::BadRequest(err.to_string())
            }
            CensusError::Request(_) => ApiError::BadGateway {
                message: err.to_string(),
                details: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city: String,
    pub state: String,
    pub zip_code: Option<String>,
}

fn is_state_code(token: &str) -> bool {
    token.len() == 2 && token.chars().all(|c| c.is_ascii_uppercase())
}

fn zip_prefix(token: &str) -> Option<&str> {
    let zip = token.get(..5)?;
    zip.chars().all(|c| c.is_ascii_digit()).then_some(zip)
}

/// Split "street, city, ST 12345" into city / state / zip
///
/// The last comma part may be "ST 12345", "ST" or a full state name; fewer
/// than two parts never match.
pub fn parse_address(address: &str) -> Option<Location> {
    let parts: Vec<&str> = address.split(',').map(str::trim).collect();
    if parts.len() < 2 {
        return None;
    }
    let last = parts[parts.len() - 1];
    let city = parts[parts.len() - 2].to_string();

    let tokens: Vec<&str> = last.split_whitespace().collect();
    for pair in tokens.windows(2) {
        if is_state_code(pair[0]) {
            if let Some(zip) = zip_prefix(pair[1]) {
                return Some(Location {
                    city,
                    state: pair[0].to_string(),
                    zip_code: Some(zip.to_string()),
                });
            }
        }
    }

    if is_state_code(last) {
        return Some(Location {
            city,
            state: last.to_string(),
            zip_code: None,
        });
    }

    state_code_for_name(last).map(|state| Location {
        city,
        state: state.to_string(),
        zip_code: None,
    })
}

/// ACS 5-year state estimates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcsFigures {
    pub population: i64,
    pub median_income: i64,
    pub total_commuters: i64,
    pub total_households: i64,
    pub owner_occupied: i64,
    pub median_age: f64,
    /// Commuters travelling 60 minutes or more
    pub long_commuters: i64,
}

impl AcsFigures {
    fn from_row(row: &[Value]) -> Self {
        let int = |i: usize| row.get(i).and_then(cell_str).and_then(leading_integer).unwrap_or(0);
        Self {
            population: int(0),
            median_income: int(1),
            total_commuters: int(2),
            total_households: int(3),
            owner_occupied: int(4),
            median_age: row
                .get(5)
                .and_then(cell_str)
                .and_then(leading_number)
                .unwrap_or(0.0),
            long_commuters: int(6),
        }
    }
}

fn cell_str(value: &Value) -> Option<&str> {
    value.as_str()
}

fn percent(part: i64, whole: i64) -> f64 {
    if whole > 0 {
        ((part as f64 / whole as f64) * 1000.0).round() / 10.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    #[serde(flatten)]
    pub figures: AcsFigures,
    pub unemployment_rate: f64,
    pub location: Location,
    pub home_ownership_rate: f64,
    pub long_commute_rate: f64,
    pub data_year: String,
    pub data_source: String,
}

impl Demographics {
    pub fn new(figures: AcsFigures, location: Location) -> Self {
        Self {
            unemployment_rate: unemployment_rate(&location.state),
            home_ownership_rate: percent(figures.owner_occupied, figures.total_households),
            long_commute_rate: percent(figures.long_commuters, figures.total_commuters),
            figures,
            location,
            data_year: "2023".to_string(),
            data_source: "U.S. Census Bureau - American Community Survey".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorTotals {
    pub employees: i64,
    /// PAYANN, in thousands of dollars
    pub annual_payroll: i64,
}

impl std::ops::Add for SectorTotals {
    type Output = SectorTotals;

    fn add(self, other: SectorTotals) -> SectorTotals {
        SectorTotals {
            employees: self.employees + other.employees,
            annual_payroll: self.annual_payroll + other.annual_payroll,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BusinessPatterns {
    pub transportation: SectorTotals,
    pub manufacturing: SectorTotals,
    pub warehousing: SectorTotals,
}

impl BusinessPatterns {
    /// Fold per-NAICS rows into the three reported sectors
    pub fn aggregate(rows: &[(&str, SectorTotals)]) -> Self {
        let sum = |codes: &[&str]| {
            rows.iter()
                .filter(|(naics, _)| codes.contains(naics))
                .fold(SectorTotals::default(), |acc, (_, totals)| acc + *totals)
        };
        Self {
            transportation: sum(&["48", "49"]),
            manufacturing: sum(&["31", "32", "33"]),
            warehousing: sum(&["493"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentData {
    pub total_employment: i64,
    pub stable_employment: i64,
    /// Stable share of total employment, %
    pub employment_stability_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateLocation {
    pub state: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustrialData {
    pub location: StateLocation,
    pub county_business_patterns: Option<BusinessPatterns>,
    pub employment_data: Option<EmploymentData>,
    pub data_source: String,
    pub data_year: String,
}

pub struct CensusClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl CensusClient {
    pub fn new(api_key: Option<String>) -> Result<Self, CensusError> {
        Self::with_base_url(api_key, CENSUS_API_BASE)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Result<Self, CensusError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CensusError::Request(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.into(),
        })
    }

    /// Second row of a Census table query
    async fn fetch_row(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<Value>, CensusError> {
        let mut query: Vec<(&str, String)> = params.to_vec();
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }

        let response = self
            .http
            .get(format!("{}/{}", self.base_url, path))
            .query(&query)
            .send()
            .await
            .map_err(|e| CensusError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CensusError::Request(format!("HTTP {} from {}", status, path)));
        }

        let mut table: Vec<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| CensusError::Request(format!("Invalid Census table: {}", e)))?;

        if table.len() < 2 {
            return Err(CensusError::Request(format!("No data rows from {}", path)));
        }
        Ok(table.swap_remove(1))
    }

    pub async fn state_figures(&self, fips: &str) -> Result<AcsFigures, CensusError> {
        let row = self
            .fetch_row(
                "2023/acs/acs5",
                &[
                    (
                        "get",
                        "B01003_001E,B19013_001E,B08303_001E,B25003_001E,B25003_002E,B01002_001E,B08303_013E"
                            .to_string(),
                    ),
                    ("for", format!("state:{}", fips)),
                ],
            )
            .await?;
        Ok(AcsFigures::from_row(&row))
    }

    /// Demographics for the state of `address`
    ///
    /// An ACS failure yields zeroed figures rather than an error.
    pub async fn demographics_for_address(&self, address: &str) -> Result<Demographics, CensusError> {
        let location =
            parse_address(address).ok_or_else(|| CensusError::UnparseableAddress(address.to_string()))?;
        let fips = state_fips(&location.state)
            .ok_or_else(|| CensusError::UnknownState(location.state.clone()))?;

        info!(city = %location.city, state = %location.state, "Fetching demographics");

        let figures = match self.state_figures(fips).await {
            Ok(figures) => figures,
            Err(e) => {
                warn!(state = %location.state, error = %e, "ACS query failed, reporting zeroed figures");
                AcsFigures::default()
            }
        };

        Ok(Demographics::new(figures, location))
    }

    /// CBP totals; `None` when every sector query failed
    pub async fn business_patterns(&self, fips: &str) -> Option<BusinessPatterns> {
        let mut rows = Vec::with_capacity(CBP_SECTORS.len());

        for naics in CBP_SECTORS {
            let params = [
                ("get", "EMP,PAYANN".to_string()),
                ("for", format!("state:{}", fips)),
                ("NAICS2017", format!("{}*", naics)),
            ];
            match self.fetch_row("2022/cbp", &params).await {
                Ok(row) => {
                    let int = |i: usize| row.get(i).and_then(cell_str).and_then(leading_integer).unwrap_or(0);
                    rows.push((
                        naics,
                        SectorTotals {
                            employees: int(0),
                            annual_payroll: int(1),
                        },
                    ));
                }
                Err(e) => warn!(naics, error = %e, "CBP query failed, skipping sector"),
            }
        }

        (!rows.is_empty()).then(|| BusinessPatterns::aggregate(&rows))
    }

    pub async fn employment(&self, fips: &str) -> Option<EmploymentData> {
        let params = [
            ("get", "Emp,EmpS".to_string()),
            ("for", format!("state:{}", fips)),
            ("time", QWI_QUARTER.to_string()),
        ];

        match self.fetch_row("timeseries/qwi/sa", &params).await {
            Ok(row) => {
                let int = |i: usize| row.get(i).and_then(cell_str).and_then(leading_integer).unwrap_or(0);
                let (total, stable) = (int(0), int(1));
                Some(EmploymentData {
                    total_employment: total,
                    stable_employment: stable,
                    employment_stability_rate: if stable > 0 { percent(stable, total) } else { 0.0 },
                })
            }
            Err(e) => {
                warn!(error = %e, "QWI employment query failed");
                None
            }
        }
    }

    /// Industrial profile for the state of `address`; `Ok(None)` when no source answered
    pub async fn industrial_for_address(&self, address: &str) -> Result<Option<IndustrialData>, CensusError> {
        let location =
            parse_address(address).ok_or_else(|| CensusError::UnparseableAddress(address.to_string()))?;
        let fips = state_fips(&location.state)
            .ok_or_else(|| CensusError::UnknownState(location.state.clone()))?;

        info!(state = %location.state, "Fetching industrial data");

        let patterns = self.business_patterns(fips).await;
        let employment = self.employment(fips).await;

        if patterns.is_none() && employment.is_none() {
            return Ok(None);
        }

        Ok(Some(IndustrialData {
            location: StateLocation {
                state: location.state,
            },
            county_business_patterns: patterns,
            employment_data: employment,
            data_source: "U.S. Census Bureau - County Business Patterns & LEHD".to_string(),
            data_year: "2022-2023".to_string(),
        }))
    }
}
