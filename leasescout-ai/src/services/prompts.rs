//! Prompt builders for every AI call the service makes
//!
//! Each builder asks for a JSON document whose field names match the
//! deserializers in `crate::models`.

use crate::models::{
    BuildingAnalysis, DiscoveryConfig, MarketAnalysis, Property, RateRequest, TenantCandidate,
};

fn or_unspecified(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("Not specified")
}

fn format_acreage(acreage: Option<f64>, missing: &str) -> String {
    acreage.map(|a| a.to_string()).unwrap_or_else(|| missing.to_string())
}

/// Stage 1: building configuration (Gemini)
pub fn building_configuration(property: &Property) -> String {
    format!(
        r#"Analyze this industrial property for emerging-tenant leasing:

PROPERTY DATA:
Address: {address}
Type: {kind}
Square Footage: {sqft} sq ft
Acreage: {acreage} acres
Features: {features}

ANALYZE FOR:
1. Building configuration (e.g., "warehouse with X loading docks", "office with Y parking spaces")
2. Property features that match operational needs
3. Brief property info (zoning, proximity advantages)

Return JSON:
{{
  "configuration": "detailed building layout description with dock count, parking, etc.",
  "propertyFeatures": ["feature1", "feature2", "feature3"],
  "briefPropertyInfo": "zoning and location advantages",
  "marketFit": "suitability for target tenant types",
  "technicalSpecs": {{
    "buildingType": "{kind}",
    "totalArea": {sqft},
    "landArea": {land},
    "loadingDocks": "estimated_count",
    "clearHeight": "estimated_height",
    "parkingSpaces": "estimated_count"
  }},
  "targetUseTypes": ["warehouse_space", "office_space", "mixed_use", "other"]
}}

Focus on practical operational details that emerging companies would need."#,
        address = property.address,
        kind = property.property_type,
        sqft = property.square_footage,
        acreage = format_acreage(property.acreage, "N/A"),
        land = format_acreage(property.acreage, "0"),
        features = property.features_or("Standard industrial features"),
    )
}

/// Stage 2: area growth and market trends (OpenAI)
pub fn market_trends(address: &str) -> String {
    format!(
        r#"Analyze area growth trends and economic patterns for: {address}

Focus on emerging business opportunities and economic indicators that would attract growing companies:

Return JSON:
{{
  "areaGrowthTrends": "economic patterns benefiting new businesses (job growth, infrastructure, etc.)",
  "nationalIndustryTrend": "broader industry trends affecting this area",
  "boomingIndustry": "high-demand sectors in this region",
  "recentRealEstateNews": "relevant local real estate developments",
  "localTrends": "2-3 sentence summary of local economic conditions",
  "industryGrowth": "industrial market growth summary",
  "areaGrowthScore": numerical_score_1_to_10,
  "demandIndicators": ["economic_factor1", "economic_factor2", "economic_factor3"],
  "competitiveFactors": ["location_advantage1", "location_advantage2"]
}}

Focus on factors that would attract emerging, growing companies rather than large corporations."#
    )
}

/// Stage 3: tenant discovery (OpenAI)
///
/// Missing stage 1/2 output falls back to generic wording.
pub fn tenant_discovery(
    property: &Property,
    building: Option<&BuildingAnalysis>,
    market: Option<&MarketAnalysis>,
    config: &DiscoveryConfig,
) -> String {
    let excluded = config.exclude_companies.join(", ");
    let industries = config.focus_industries.join("|");
    let scope = if config.targets_emerging_companies() {
        "EMERGING and SCALING"
    } else {
        "potential"
    };
    let target_list = config
        .target_types
        .iter()
        .map(|t| format!("- {}", t))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Discover {count} {scope} companies (AVOID: {excluded}) that could lease this property:

PROPERTY DETAILS:
- Address: {address}
- Type: {kind}
- Size: {sqft} sq ft
- Configuration: {configuration}
- Features: {features}

AREA GROWTH TRENDS:
- Economic Trends: {trends}
- Industry Growth: {industry}

SEARCH CRITERIA:
- Find companies with operations within {radius} miles of the property
- Focus on EMERGING, GROWING, SCALING, EXPANDING or MID-SIZED companies
- Strategy: {strategy}
- Preferred company size: {size}
- Exclude large corporations (e.g., {excluded})
- Target industries: {focus_industries}
- Companies with operational needs matching the building configuration
- Companies benefiting from area economic growth trends

TARGET TYPES:
{target_list}

For each company, provide:
{{
  "tenants": [
    {{
      "company": "Company Name",
      "nearbyLocation": "specific nearby site/facility (within {nearby_radius} miles)",
      "distance": "miles from property",
      "operations": "core business description",
      "benefitType": "warehouse_space|office_space|mixed_use|other",
      "industryType": "{industries}|Other"
    }}
  ]
}}

Focus on: {targets}.
Provide at least {result_count} potential tenants with {tone} analysis.
If you cannot find enough, try to widen the search criteria slightly, or include more significant companies.
Ensure the output is in JSON format. Do not include any other text or explanations outside the JSON structure."#,
        count = config.discovery_count(),
        address = property.address,
        kind = property.property_type,
        sqft = property.square_footage,
        configuration = building
            .and_then(|b| b.configuration.as_deref())
            .unwrap_or("Industrial facility"),
        features = property.features_or("Standard industrial"),
        trends = market
            .and_then(|m| m.area_growth_trends.as_deref())
            .unwrap_or("Growing market"),
        industry = market
            .and_then(|m| m.national_industry_trend.as_deref())
            .unwrap_or("Positive trends"),
        radius = config.search_radius_miles,
        strategy = config.discovery_strategy.replace('_', " "),
        size = config.preferred_company_size.replace('_', " "),
        focus_industries = config.focus_industries.join(", "),
        nearby_radius = config.search_radius_miles.min(300),
        targets = config.target_types.join(", "),
        result_count = config.result_count,
        tone = config.tone,
    )
}

/// Stage 4: batched AI scoring (OpenAI)
pub fn tenant_scoring(
    tenants: &[TenantCandidate],
    property: &Property,
    market: Option<&MarketAnalysis>,
) -> String {
    let candidates = tenants
        .iter()
        .enumerate()
        .map(|(idx, t)| {
            format!(
                "{}. {} - {} ({}, {} miles away)",
                idx + 1,
                t.company,
                t.operations,
                t.industry_type,
                t.distance
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a commercial real estate AI analyst. Analyze and score these {n} potential tenants for the property.

PROPERTY CONTEXT:
- Address: {address}
- Type: {kind}
- Size: {sqft} sq ft
- Acreage: {acreage} acres
- Features: {features}

MARKET CONTEXT:
- Area Growth Score: {growth}/10
- Area Trends: {trends}
- Industry Growth: {industry}

TENANT CANDIDATES:
{candidates}

SCORING CRITERIA (1-10 scale):
1. **Market Fit**: Area growth trends + industry sector alignment
2. **Property Match**: Operational needs + building compatibility
3. **Growth Potential**: Company capacity + market timing + competitive pressure

For each tenant, provide detailed AI analysis:

{{
  "tenantScores": [
    {{
      "company": "Tenant Name",
      "marketFit": score_1_to_10,
      "propertyMatch": score_1_to_10,
      "growthPotential": score_1_to_10,
      "finalScore": weighted_score_1_to_100,
      "reasoning": "3-4 sentence value proposition explaining why this property benefits this tenant, including operational advantages, strategic positioning, and market timing.",
      "keyStrengths": ["strength1", "strength2", "strength3"],
      "riskFactors": ["risk1", "risk2"]
    }}
  ]
}}

Calculate finalScore as: (marketFit * 0.35 + propertyMatch * 0.40 + growthPotential * 0.25) * 10
Use the exact company names listed above.

Focus on emerging companies strategy - prioritize growing businesses over large corporations.
Write the reasoning as a compelling value proposition that could be used in leasing presentations.
Provide realistic scores with variation between tenants. Be analytical and data-driven."#,
        n = tenants.len(),
        address = property.address,
        kind = property.property_type,
        sqft = property.square_footage,
        acreage = property.acreage.unwrap_or(0.0),
        features = property.features_or("Standard industrial"),
        growth = MarketAnalysis::growth_score(market),
        trends = market
            .and_then(|m| m.area_growth_trends.as_deref())
            .unwrap_or("Positive growth"),
        industry = market
            .and_then(|m| m.national_industry_trend.as_deref())
            .unwrap_or("Stable growth"),
    )
}

const RATE_FACTORS: &str = "ANALYSIS CONTEXT:
This property will be evaluated for an industrial real estate investment. The lease rate is crucial for calculating NOI (Net Operating Income) and cap rate.

ANALYSIS INSTRUCTIONS:
1. Analyze the local industrial real estate market in this area
2. Consider the following factors:
   - Geographic location and logistics access
   - Dominant industry type in the region
   - Local vacancy rate
   - Market demand for this property type
   - Proximity to highways, ports, airports
   - Zoning and local regulations
   - Recent comparables in the area";

const RESEARCH_RULES: &str = "You are an expert in industrial site locations, investments, and leasing. \
Do NOT invent or hallucinate data. If you do not have enough data, say so. Do not sugarcoat the results. \
This analysis is used to evaluate whether to purchase the property. For every numeric claim (vacancy, cap rate, \
lease rate), cite the source in parentheses with publication and date. Flag any figures older than Q2 2023.";

fn property_block(request: &RateRequest) -> String {
    format!(
        "PROPERTY TO ANALYZE:\n- Address: {}\n- Property Type: {}\n- Building Size: {} sq ft",
        request.property_address,
        or_unspecified(request.property_type.as_deref()),
        or_unspecified(request.building_size.as_deref()),
    )
}

/// Annual building lease rate per square foot
pub fn building_rate(request: &RateRequest) -> String {
    format!(
        r#"You are an expert in industrial real estate valuation. Analyze this property and provide an estimation of the annual lease rate per square foot.

{property}

{factors}

REQUIRED RESPONSE (strict JSON format):
{{
  "estimatedRate": number,
  "confidence": "high" | "medium" | "low"
}}

CONSTRAINTS:
- Rate must be in USD per sq ft per year
- Base your analysis on known real market data
- If data is insufficient, indicate "low" confidence
- Provide only the JSON, no additional text"#,
        property = property_block(request),
        factors = RATE_FACTORS,
    )
}

/// Industrial outside storage land rate per acre per month
pub fn land_rate(request: &RateRequest) -> String {
    format!(
        r#"{rules}

Determine the market lease rate for Industrial Outside Storage (IOS) land at this property, considering the building's square footage and the rest of the land used for outside storage. Quote rates per acre per month ($/AC/Mo) as an average market rate with lower-end and higher-end pricing.

{property}

{factors}

REQUIRED RESPONSE (strict JSON format):
{{
  "averageMarketRate": number,
  "estimatedLowerEnd": number,
  "estimatedUpperEnd": number,
  "confidence": "high" | "medium" | "low"
}}

CONSTRAINTS:
- Rates must be in USD per acre per month
- Base your analysis on known real market data
- If data is insufficient, indicate "low" confidence
- Provide only the JSON, no additional text"#,
        rules = RESEARCH_RULES,
        property = property_block(request),
        factors = RATE_FACTORS,
    )
}

/// Investment recommendation with live web research (Claude)
pub fn investment_recommendation(request: &RateRequest) -> String {
    format!(
        r#"Investment Recommendation and Strategic Positioning

{rules}
Browse the web in real time to research the latest market information and metrics. Cover:
property and location strengths and risks, market strengths and risks, key investment strengths,
risk factors requiring monitoring, investment opportunity timing, acquisition strategy, and a summary.

{property}
- Asking Price: {price}

Respond between <json></json> tags using exactly this schema, even when little data is available:
<json>
{{
  "propertyAnalysis": {{ "strengths": ["..."], "risks": ["..."] }},
  "marketAnalysis": {{ "strengths": ["..."], "risks": ["..."] }},
  "investmentSummary": {{
    "keyStrengths": ["..."],
    "risksToMonitor": ["..."],
    "timing": "...",
    "strategy": "...",
    "summary": "..."
  }}
}}
</json>
Do not include any text outside the JSON block."#,
        rules = RESEARCH_RULES,
        property = property_block(request),
        price = or_unspecified(request.asking_price.as_deref()),
    )
}

const RESEARCH_FIRMS: &str = "Avison Young, JLL, Colliers, Cresa, Savills, Cushman & Wakefield, CBRE, Hoff & Leigh, \
Newmark, Marcus & Millichap, Transwestern, Costar, Loopnet, Crexi, and US government data (national, state, county, city)";

/// Business developments and growth status within 30 miles (Claude)
pub fn development_data(request: &RateRequest) -> String {
    format!(
        r#"{rules}
Browse the web in real time to research the latest market information. List the top 10 new business developments and major investments within a 30-mile radius.

Is the city experiencing growth or decline? Describe every new development that will affect the property, positively or negatively, in enough detail to judge its effect on the investment. List companies offshoring or forecast to move operations into the area, with details. Summarize the new business development.

{property}

Respond between <json></json> tags using exactly this schema, even when little data is available:
<json>
{{
  "warning": "any note that does not fit the schema",
  "region": "City, ST",
  "analysisDate": "YYYY-MM-DD",
  "growthStatus": "Growing" | "Stable" | "Declining",
  "growthSummary": "...",
  "developments": [
    {{
      "name": "...",
      "type": "...",
      "distanceFromSubject": "12 miles",
      "impact": "positive" | "negative",
      "description": "...",
      "status": "...",
      "investmentValue": "$230M",
      "completionDate": "YYYY-MM",
      "source": "publication, date"
    }}
  ],
  "offshoringActivity": [
    {{
      "company": "...",
      "activity": "...",
      "location": "...",
      "forecastImpact": "positive" | "negative",
      "description": "...",
      "timeline": "...",
      "source": "publication, date"
    }}
  ],
  "developmentSummary": "..."
}}
</json>
Do not include any text outside the JSON block."#,
        rules = RESEARCH_RULES,
        property = property_block(request),
    )
}

/// Average market cap rates and comparable sales
pub fn cap_rate_analysis(request: &RateRequest) -> String {
    format!(
        r#"{rules}
Determine the average industrial cap rates for the market around this property, using research from {firms}.
If cap-rate comparables within 10 miles are not available after 2023, provide a state-level industrial cap-rate range instead and flag the limitation.

{property}

Respond with valid JSON only, using this schema:
{{
  "region": string,
  "year": number,
  "marketAverages": [{{ "label": string, "range": string }}],
  "subjectProperty": {{
    "locationNotes": string,
    "classification": string,
    "expectedCapRateRange": string
  }},
  "marketContext": [string],
  "comparableSales": [{{ "name": string, "size": string, "location": string, "capRateRange": string, "source": string }}],
  "investmentRecommendation": {{
    "targetCapRateRange": string,
    "justification": [string]
  }}
}}"#,
        rules = RESEARCH_RULES,
        firms = RESEARCH_FIRMS,
        property = property_block(request),
    )
}

/// Economic outlook, vacancy, absorption, lease and cap rates, incentives
pub fn market_overview(request: &RateRequest) -> String {
    format!(
        r#"{rules}
Using research from {firms}:
- Is the market in an economic boom, growing, slowing down or stagnant? Explain why. This metric is required.
- Provide the vacancy rate, absorption rate, building and IOS land lease rates, and the average market cap rate.
- List any tax or other incentives.
- Summarize the market.

{property}

Respond with valid JSON only, using this schema:
{{
  "region": string,
  "year": number,
  "economicOutlook": {{ "status": "Boom" | "Growing" | "Slowing" | "Stagnant", "description": string }},
  "vacancyRate": {{ "value": string, "source": string }},
  "absorptionRate": {{ "value": string, "source": string }},
  "leaseRates": {{
    "buildingRate": {{ "average": string, "range": string, "source": string }},
    "iosLandRate": {{ "average": string, "range": string, "source": string }}
  }},
  "capRates": {{ "average": string, "range": string, "source": string }},
  "taxIncentives": [{{ "name": string, "description": string, "source": string }}],
  "marketSummary": string
}}"#,
        rules = RESEARCH_RULES,
        firms = RESEARCH_FIRMS,
        property = property_block(request),
    )
}
