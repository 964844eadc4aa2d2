//! HTTP API handlers for leasescout-ai
//!
//! REST routes plus one SSE stream for progress events. Successful data
//! responses share the `{ success, data, timestamp }` envelope.

pub mod census;
pub mod config;
pub mod export;
pub mod health;
pub mod market;
pub mod proxy;
pub mod rates;
pub mod sse;
pub mod tenant_research;

pub use census::census_routes;
pub use config::config_routes;
pub use export::export_routes;
pub use health::health_routes;
pub use market::market_routes;
pub use proxy::proxy_routes;
pub use rates::rate_routes;
pub use sse::progress_event_stream;
pub use tenant_research::tenant_research_routes;

use axum::http::{StatusCode, Uri};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

/// Standard success envelope
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            timestamp: Utc::now(),
        })
    }
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "code": "NOT_FOUND",
                "message": format!("Route not found: {}", uri.path()),
            }
        })),
    )
}
