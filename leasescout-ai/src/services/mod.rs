//! Service modules for property analysis
//!
//! Leaves first: the AI gateway and progress tracker carry no domain
//! knowledge; scoring and prompts are pure; the pipeline sequences them.
//! Census, rates, market research, recommendation and export are
//! independent adapters.

pub mod ai_gateway;
pub mod ai_scoring;
pub mod analysis_pipeline;
pub mod census_client;
pub mod config_store;
pub mod docs_exporter;
pub mod investment_advisor;
pub mod market_researcher;
pub mod progress_tracker;
pub mod prompts;
pub mod rate_estimator;
pub mod scoring;

pub use ai_gateway::{AiGateway, CallOptions, HttpTransport, Provider, ProviderKeys, ProviderTransport};
pub use analysis_pipeline::AnalysisPipeline;
pub use census_client::{CensusClient, CensusError};
pub use config_store::ConfigStore;
pub use docs_exporter::{DocsExporter, ExportError, GoogleCredentials};
pub use investment_advisor::InvestmentAdvisor;
pub use market_researcher::MarketResearcher;
pub use progress_tracker::ProgressTracker;
pub use rate_estimator::RateEstimator;
