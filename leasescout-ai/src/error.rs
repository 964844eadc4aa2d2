//! Error types for leasescout-ai
//!
//! `AnalysisError` is the domain taxonomy shared by the gateway, the
//! pipeline and the data adapters. `ApiError` is what handlers return;
//! it owns the HTTP status mapping and the `{ "error": { code, message } }`
//! body shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::services::ai_gateway::Provider;

/// Domain errors raised while talking to providers or running an analysis
#[derive(Debug, Clone, Error)]
pub enum AnalysisError {
    /// Transport failure or non-2xx reply from an AI provider or data source
    #[error("{provider} request failed: {message}")]
    Upstream {
        provider: Provider,
        status: Option<u16>,
        message: String,
        /// Raw provider body, when one was returned
        payload: Option<Value>,
    },

    /// Provider replied but no usable completion text could be extracted
    #[error("No content received from {provider}")]
    EmptyResponse { provider: Provider },

    /// Expected JSON could not be located or decoded in a completion
    #[error("Parse error: {0}")]
    Parse(String),

    /// Caller-supplied data rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Failure outside the individual stages (result assembly)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upstream provider failure (502)
    #[error("Upstream failure: {message}")]
    BadGateway {
        message: String,
        details: Option<Value>,
    },

    /// Feature not configured on this instance (503)
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Validation(msg) => ApiError::BadRequest(msg),
            AnalysisError::SessionNotFound(id) => {
                ApiError::NotFound(format!("Session not found: {}", id))
            }
            AnalysisError::Upstream { ref payload, .. } => ApiError::BadGateway {
                details: payload.clone(),
                message: err.to_string(),
            },
            AnalysisError::EmptyResponse { .. } | AnalysisError::Parse(_) => {
                ApiError::BadGateway {
                    message: err.to_string(),
                    details: None,
                }
            }
            AnalysisError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::BadGateway { message, details } => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", message, details)
            }
            ApiError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", msg, None)
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
                None,
            ),
        };

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
