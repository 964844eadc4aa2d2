//! leasescout-ai library interface
//!
//! Exposes the router, shared state and services for the binary and for
//! integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::{AnalysisError, ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use leasescout_common::events::EventBus;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{
    AiGateway, AnalysisPipeline, CensusClient, ConfigStore, DocsExporter, InvestmentAdvisor,
    MarketResearcher, ProgressTracker, RateEstimator,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: AnalysisPipeline,
    pub tracker: ProgressTracker,
    pub config_store: ConfigStore,
    /// Raw provider access for the proxy routes
    pub gateway: AiGateway,
    pub rates: RateEstimator,
    pub advisor: InvestmentAdvisor,
    pub research: MarketResearcher,
    pub census: Arc<CensusClient>,
    pub exporter: Arc<DocsExporter>,
    /// Progress events for SSE
    pub event_bus: EventBus,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last analysis failure, reported by /health
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        gateway: AiGateway,
        census: CensusClient,
        exporter: DocsExporter,
        event_bus: EventBus,
    ) -> Self {
        let tracker = ProgressTracker::new(event_bus.clone());
        Self::with_tracker(gateway, tracker, census, exporter)
    }

    /// State around an existing tracker (custom timings in tests)
    pub fn with_tracker(
        gateway: AiGateway,
        tracker: ProgressTracker,
        census: CensusClient,
        exporter: DocsExporter,
    ) -> Self {
        let config_store = ConfigStore::default();
        let event_bus = tracker.event_bus().clone();

        Self {
            pipeline: AnalysisPipeline::new(gateway.clone(), tracker.clone(), config_store.clone()),
            rates: RateEstimator::new(gateway.clone()),
            advisor: InvestmentAdvisor::new(gateway.clone()),
            research: MarketResearcher::new(gateway.clone()),
            tracker,
            config_store,
            gateway,
            census: Arc::new(census),
            exporter: Arc::new(exporter),
            event_bus,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::config_routes())
        .merge(api::tenant_research_routes())
        .merge(api::census_routes())
        .merge(api::rate_routes())
        .merge(api::market_routes())
        .merge(api::export_routes())
        .merge(api::proxy_routes())
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
