//! Mutable discovery configuration
//!
//! The store is injected into the pipeline and the config routes. Each
//! analysis run works from a snapshot, so a concurrent update never changes
//! the parameters of a run already in progress.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::AnalysisError;
use crate::models::{DiscoveryConfig, DiscoveryConfigPatch};

#[derive(Clone, Default)]
pub struct ConfigStore {
    current: Arc<RwLock<DiscoveryConfig>>,
}

impl ConfigStore {
    pub fn new(initial: DiscoveryConfig) -> Self {
        Self {
            current: Arc::new(RwLock::new(initial)),
        }
    }

    pub async fn snapshot(&self) -> DiscoveryConfig {
        self.current.read().await.clone()
    }

    /// Replace the whole configuration after validating it
    pub async fn replace(&self, config: DiscoveryConfig) -> Result<DiscoveryConfig, AnalysisError> {
        config.validate()?;
        *self.current.write().await = config.clone();
        info!(result_count = config.result_count, "Discovery configuration replaced");
        Ok(config)
    }

    /// Apply a partial update; the stored value is untouched on error
    pub async fn update(&self, patch: DiscoveryConfigPatch) -> Result<DiscoveryConfig, AnalysisError> {
        let mut current = self.current.write().await;
        let updated = patch.apply(&current)?;
        *current = updated.clone();
        info!(
            result_count = updated.result_count,
            search_radius_miles = updated.search_radius_miles,
            "Discovery configuration updated"
        );
        Ok(updated)
    }

    pub async fn reset(&self) -> DiscoveryConfig {
        let defaults = DiscoveryConfig::default();
        *self.current.write().await = defaults.clone();
        info!("Discovery configuration reset to defaults");
        defaults
    }
}
