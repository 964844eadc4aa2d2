//! Google Docs export
//!
//! Uses the OAuth refresh-token flow: every export exchanges the refresh
//! token for a short-lived access token, creates a document, inserts the
//! payload text and optionally files it under the configured Drive folder.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::error::ApiError;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DOCS_URL: &str = "https://docs.googleapis.com/v1/documents";
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_TITLE: &str = "Analysis Report";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Google Docs API not configured")]
    NotConfigured,

    #[error("Google authorization failed: {0}")]
    Auth(String),

    #[error("Google Docs request failed: {0}")]
    Request(String),
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NotConfigured => ApiError::Unavailable(err.to_string()),
            ExportError::Auth(_) | ExportError::Request(_) => ApiError::BadGateway {
                message: err.to_string(),
                details: None,
            },
        }
    }
}

/// OAuth client and refresh token
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedDocument {
    pub document_id: String,
    pub url: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    document_id: String,
}

/// Strings are inserted verbatim, anything else pretty-printed
pub fn document_text(payload: &Value) -> String {
    match payload {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

pub struct DocsExporter {
    http: reqwest::Client,
    credentials: Option<GoogleCredentials>,
    folder_id: Option<String>,
}

impl DocsExporter {
    pub fn new(credentials: Option<GoogleCredentials>, folder_id: Option<String>) -> Result<Self, ExportError> {
        if credentials.is_none() {
            warn!("Google API credentials not configured, document export disabled");
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ExportError::Request(e.to_string()))?;

        Ok(Self {
            http,
            credentials,
            folder_id,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn access_token(&self, credentials: &GoogleCredentials) -> Result<String, ExportError> {
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("refresh_token", credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| ExportError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ExportError::Auth(format!("token endpoint returned {}", response.status())));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ExportError::Auth(e.to_string()))?;
        Ok(token.access_token)
    }

    async fn post_json(&self, url: &str, token: &str, body: &Value) -> Result<reqwest::Response, ExportError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| ExportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::Request(format!("HTTP {}: {}", status, body)));
        }
        Ok(response)
    }

    async fn move_to_folder(&self, token: &str, document_id: &str, folder_id: &str) -> Result<(), ExportError> {
        let response = self
            .http
            .patch(format!("{}/{}", DRIVE_FILES_URL, document_id))
            .bearer_auth(token)
            .query(&[("addParents", folder_id)])
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| ExportError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ExportError::Request(format!("Drive move returned {}", response.status())));
        }
        Ok(())
    }

    /// Create a document titled `title` holding `payload`
    pub async fn export(&self, title: &str, payload: &Value) -> Result<ExportedDocument, ExportError> {
        let credentials = self.credentials.as_ref().ok_or(ExportError::NotConfigured)?;

        let result = async {
            let token = self.access_token(credentials).await?;

            let created: CreatedDocument = self
                .post_json(DOCS_URL, &token, &json!({ "title": title }))
                .await?
                .json()
                .await
                .map_err(|e| ExportError::Request(e.to_string()))?;
            let document_id = created.document_id;

            let requests = json!({
                "requests": [{
                    "insertText": {
                        "location": { "index": 1 },
                        "text": document_text(payload),
                    }
                }]
            });
            self.post_json(&format!("{}/{}:batchUpdate", DOCS_URL, document_id), &token, &requests)
                .await?;

            if let Some(folder_id) = &self.folder_id {
                // The document stays usable outside the folder
                if let Err(e) = self.move_to_folder(&token, &document_id, folder_id).await {
                    warn!(document_id = %document_id, error = %e, "Could not move document into folder");
                }
            }

            Ok(ExportedDocument {
                url: format!("https://docs.google.com/document/d/{}", document_id),
                document_id,
            })
        }
        .await;

        match &result {
            Ok(doc) => info!(document_id = %doc.document_id, title, "Document exported to Google Docs"),
            Err(e) => error!(error = %e, title, "Google Docs save failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_text() {
        assert_eq!(document_text(&json!("plain report")), "plain report");
        assert_eq!(document_text(&json!({"a": 1})), "{\n  \"a\": 1\n}");
        assert_eq!(document_text(&json!(42)), "42");
    }

    #[tokio::test]
    async fn test_unconfigured_export() {
        let exporter = DocsExporter::new(None, None).unwrap();
        assert!(!exporter.is_configured());

        let err = exporter.export(DEFAULT_TITLE, &json!("x")).await.unwrap_err();
        assert!(matches!(err, ExportError::NotConfigured));
        assert!(matches!(ApiError::from(err), ApiError::Unavailable(_)));
    }
}
