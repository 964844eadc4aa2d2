//! Multi-stage property analysis
//!
//! Stages run strictly in order:
//!
//! 1. Building configuration (Gemini)
//! 2. Area growth / market trends (OpenAI)
//! 3. Tenant discovery, enrichment, heuristic ranking (OpenAI)
//! 4. AI scoring, only when the property asks for it (OpenAI)
//!
//! A stage failure is recorded in the report's error map and the run
//! continues with defaults. Only a failure outside the stages is terminal.
//! `spawn_analysis` runs the whole analysis on its own task, so a dropped
//! HTTP request never cancels it, and marks the session errored on any
//! terminal failure, including a panic.

use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::error::AnalysisError;
use crate::models::analysis::{total_steps, FOCUS_STRATEGY, PROMPT_VERSION};
use crate::models::{
    AnalysisMetadata, AnalysisReport, AnalysisStage, BuildingAnalysis, DiscoveryConfig,
    MarketAnalysis, MarketContext, Property, PropertyAnalysisView, PropertyInput, StageErrors,
    TenantCandidate,
};
use crate::services::ai_gateway::{AiGateway, CallOptions};
use crate::services::ai_scoring;
use crate::services::config_store::ConfigStore;
use crate::services::progress_tracker::ProgressTracker;
use crate::services::{prompts, scoring};
use crate::utils::parse_json_object;

pub const BUILDING_MODEL: &str = "gemini-2.0-flash";
pub const BUILDING_MAX_TOKENS: u32 = 4500;
pub const MARKET_MODEL: &str = "o3-mini";
pub const MARKET_MAX_TOKENS: u32 = 1000;
pub const DISCOVERY_MAX_TOKENS: u32 = 3000;

#[derive(Debug, Deserialize)]
struct DiscoveryReply {
    #[serde(default)]
    tenants: Vec<TenantCandidate>,
}

/// Tenants ranked by stage 3
struct Discovery {
    ranked: Vec<TenantCandidate>,
    discovered: usize,
}

#[derive(Clone)]
pub struct AnalysisPipeline {
    gateway: AiGateway,
    tracker: ProgressTracker,
    config_store: ConfigStore,
}

impl AnalysisPipeline {
    pub fn new(gateway: AiGateway, tracker: ProgressTracker, config_store: ConfigStore) -> Self {
        Self {
            gateway,
            tracker,
            config_store,
        }
    }

    /// Run the analysis on a detached task and wait for its outcome
    ///
    /// The task keeps running if the caller goes away. A panic or terminal
    /// error errors the session; validation errors never create one.
    pub async fn spawn_analysis(
        &self,
        input: PropertyInput,
        session_id: Option<String>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let pipeline = self.clone();
        let task_session = session_id.clone();
        let handle = tokio::spawn(async move { pipeline.analyze(input, task_session.as_deref()).await });

        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(AnalysisError::Internal(format!("Analysis task failed: {}", e))),
        };

        if let (Err(e), Some(id)) = (&outcome, session_id.as_deref()) {
            if !matches!(e, AnalysisError::Validation(_)) {
                error!(session_id = %id, error = %e, "Analysis terminated");
                self.tracker.error_session(id, e.to_string()).await;
            }
        }
        outcome
    }

    /// Run every stage for `input`, reporting progress under `session_id`
    ///
    /// The property is validated before any session is created or any
    /// provider is called. Terminal failures are left to the caller to
    /// report; `spawn_analysis` does so.
    pub async fn analyze(
        &self,
        input: PropertyInput,
        session_id: Option<&str>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let property = input.validate()?;
        let config = self.config_store.snapshot().await;
        let use_ai_scoring = property.use_ai_scoring;

        if let Some(id) = session_id {
            self.tracker.create_session(id, use_ai_scoring).await;
        }

        info!(
            address = %property.address,
            session_id = session_id.unwrap_or("-"),
            use_ai_scoring,
            "Starting property analysis"
        );

        let mut errors = StageErrors::default();

        // Stage 1
        self.enter(session_id, AnalysisStage::BuildingConfiguration).await;
        let building = match self.analyze_building(&property).await {
            Ok(building) => Some(building),
            Err(e) => {
                error!(error = %e, address = %property.address, "Building configuration analysis failed");
                errors.record(AnalysisStage::BuildingConfiguration);
                None
            }
        };

        // Stage 2
        self.enter(session_id, AnalysisStage::MarketTrends).await;
        let market = match self.analyze_market(&property.address).await {
            Ok(market) => Some(market),
            Err(e) => {
                error!(error = %e, address = %property.address, "Market trends analysis failed");
                errors.record(AnalysisStage::MarketTrends);
                None
            }
        };

        // Stage 3
        self.enter(session_id, AnalysisStage::TenantDiscovery).await;
        let discovery = match self
            .discover_tenants(&property, building.as_ref(), market.as_ref(), &config)
            .await
        {
            Ok(discovery) => discovery,
            Err(e) => {
                error!(error = %e, address = %property.address, "Tenant discovery failed");
                errors.record(AnalysisStage::TenantDiscovery);
                Discovery {
                    ranked: Vec::new(),
                    discovered: 0,
                }
            }
        };
        let mut tenants = discovery.ranked;

        // Stage 4
        let mut ai_scored = 0;
        if use_ai_scoring {
            self.enter(session_id, AnalysisStage::AiScoring).await;
            if !tenants.is_empty() {
                match ai_scoring::score_with_ai(&self.gateway, &tenants, &property, market.as_ref()).await {
                    Ok(scores) => {
                        ai_scored = ai_scoring::merge_scores(&mut tenants, &scores);
                    }
                    Err(e) => {
                        error!(error = %e, address = %property.address, "AI scoring failed, keeping heuristic scores");
                        errors.record(AnalysisStage::AiScoring);
                    }
                }
            }
        }

        let has_errors = !errors.is_empty();
        let report = AnalysisReport {
            property_analysis: PropertyAnalysisView::from(building.as_ref()),
            market_context: MarketContext::from(market.as_ref()),
            metadata: AnalysisMetadata {
                analysis_date: Utc::now(),
                prompt_version: PROMPT_VERSION.to_string(),
                focus_strategy: FOCUS_STRATEGY.to_string(),
                discovery_strategy: config.discovery_strategy.clone(),
                ai_scoring_enabled: use_ai_scoring,
                total_steps: total_steps(use_ai_scoring),
                candidates_discovered: discovery.discovered,
                total_candidates_analyzed: tenants.len(),
                ranking_criteria: config.ranking_criteria.clone(),
                tenants_with_ai_scoring: ai_scored,
                has_errors,
            },
            tenant_ranking: tenants,
            errors,
        };

        info!(
            address = %property.address,
            tenants_found = report.tenant_ranking.len(),
            use_ai_scoring,
            has_errors,
            error_count = report.errors.count(),
            "Property analysis completed"
        );

        self.finalize(session_id, report).await
    }

    /// Attach the report to the session as its result
    async fn finalize(
        &self,
        session_id: Option<&str>,
        report: AnalysisReport,
    ) -> Result<AnalysisReport, AnalysisError> {
        if let Some(id) = session_id {
            let value = serde_json::to_value(&report).map_err(|e| {
                AnalysisError::Internal(format!("Failed to assemble analysis result: {}", e))
            })?;
            self.tracker.complete_session(id, Some(value)).await;
        }
        Ok(report)
    }

    async fn enter(&self, session_id: Option<&str>, stage: AnalysisStage) {
        if let Some(id) = session_id {
            self.tracker
                .update_progress(id, stage.step(), stage.task(), stage.details())
                .await;
        }
    }

    async fn analyze_building(&self, property: &Property) -> Result<BuildingAnalysis, AnalysisError> {
        let prompt = prompts::building_configuration(property);
        let options = CallOptions::new()
            .model(BUILDING_MODEL)
            .max_tokens(BUILDING_MAX_TOKENS)
            .temperature(0.3);
        let reply = self.gateway.call_gemini(&prompt, options).await?;
        let building: BuildingAnalysis = parse_json_object(&reply, "building analysis")?;

        info!(
            address = %property.address,
            configuration = building.configuration.as_deref().unwrap_or("-"),
            "Building configuration analysis completed"
        );
        Ok(building)
    }

    async fn analyze_market(&self, address: &str) -> Result<MarketAnalysis, AnalysisError> {
        let prompt = prompts::market_trends(address);
        let options = CallOptions::new()
            .model(MARKET_MODEL)
            .max_tokens(MARKET_MAX_TOKENS);
        let reply = self.gateway.call_openai(&prompt, options).await?;
        let market: MarketAnalysis = parse_json_object(&reply, "area growth analysis")?;

        info!(
            address = %address,
            growth_score = ?market.area_growth_score,
            "Area growth trends analysis completed"
        );
        Ok(market)
    }

    async fn discover_tenants(
        &self,
        property: &Property,
        building: Option<&BuildingAnalysis>,
        market: Option<&MarketAnalysis>,
        config: &DiscoveryConfig,
    ) -> Result<Discovery, AnalysisError> {
        let prompt = prompts::tenant_discovery(property, building, market, config);
        let options = CallOptions::new()
            .max_tokens(DISCOVERY_MAX_TOKENS)
            .temperature(0.3);
        let reply = self.gateway.call_openai(&prompt, options).await?;
        let parsed: DiscoveryReply = parse_json_object(&reply, "tenant discovery")?;

        let returned = parsed.tenants.len();
        let mut tenants: Vec<TenantCandidate> = parsed
            .tenants
            .into_iter()
            .filter(|t| !t.company.trim().is_empty())
            .collect();
        if tenants.len() < returned {
            warn!(skipped = returned - tenants.len(), "Skipping discovered tenants without a company name");
        }
        let discovered = tenants.len();

        for tenant in tenants.iter_mut() {
            scoring::enrich(tenant, property, market);
        }
        scoring::rank_tenants(&mut tenants, config.result_count as usize);

        info!(
            discovered,
            ranked = tenants.len(),
            "Emerging tenant candidates ranked"
        );
        Ok(Discovery {
            ranked: tenants,
            discovered,
        })
    }
}
