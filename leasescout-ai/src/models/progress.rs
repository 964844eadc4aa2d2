//! Progress snapshot returned to polling clients

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Point-in-time view of one analysis session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub step: u32,
    /// 3 without AI scoring, 4 with; fixed at creation
    pub total_steps: u32,
    pub current_task: String,
    pub details: String,
    pub completed: bool,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Registry statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerStats {
    pub active_sessions: usize,
    pub sessions: Vec<String>,
}
