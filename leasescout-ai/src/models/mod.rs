//! Data models for leasescout-ai

pub mod analysis;
pub mod discovery_config;
pub mod lenient;
pub mod market_research;
pub mod progress;
pub mod property;
pub mod rates;
pub mod tenant;

pub use analysis::{
    AnalysisMetadata, AnalysisReport, AnalysisStage, BuildingAnalysis, MarketAnalysis,
    MarketContext, PropertyAnalysisView, StageErrors,
};
pub use discovery_config::{DiscoveryConfig, DiscoveryConfigPatch};
pub use market_research::{
    CapRateAnalysis, CapRateFallback, DevelopmentData, DevelopmentFallback, MarketOverview,
    OverviewFallback,
};
pub use progress::{ProgressSnapshot, TrackerStats};
pub use property::{Property, PropertyInput};
pub use rates::{
    BuildingRateEstimate, Confidence, Estimate, FallbackEstimate, InvestmentRecommendation,
    LandRateComparison, LandRateEstimate, RateRequest,
};
pub use tenant::{BenefitType, IndustryType, TenantCandidate};
