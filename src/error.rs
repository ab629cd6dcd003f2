//! Error types for outbound calls and the HTTP API.
//!
//! [`EngineError`] and [`IndexerError`] describe failures talking to the
//! search engine and the indexing service. [`ApiError`] is what handlers
//! return; it renders as `{"error": .., "details"?: ..}` with a matching
//! status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a call to the search engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("engine returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode engine response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Independent schema mutations that failed; earlier successes stand.
    #[error("schema setup failed: {}", .0.join("; "))]
    Schema(Vec<String>),
}

/// Failure of a call to the indexing service.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("error sending request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status code: {status}, body: {body}")]
    Status { status: u16, body: String },

    #[error("error decoding response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Search failed: {0}")]
    Search(#[source] EngineError),

    #[error("Failed to reset index: {0}")]
    Reset(#[source] EngineError),

    #[error("Indexer error: {0}")]
    Indexer(#[from] IndexerError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, ErrorResponse::new(msg.clone()))
            }
            ApiError::NotFound(msg) => {
                tracing::debug!(message = %msg, "Not found");
                (StatusCode::NOT_FOUND, ErrorResponse::new(msg.clone()))
            }
            ApiError::Search(err) => {
                tracing::error!(error = %err, "Search request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Search request failed", err.to_string()),
                )
            }
            ApiError::Reset(err) => {
                tracing::error!(error = %err, "Index reset failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Failed to reset index", err.to_string()),
                )
            }
            ApiError::Indexer(err) => {
                tracing::error!(error = %err, "Indexer request failed");
                let status = match err {
                    IndexerError::Status { status: 404, .. } => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (
                    status,
                    ErrorResponse::with_details("Indexer request failed", err.to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
