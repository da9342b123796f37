//! HTTP error classification.
//!
//! Every failure inside a request is translated into one of these kinds
//! before it reaches the client; no internal error crosses the HTTP
//! boundary unclassified.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vidlookup_client::ResolveError;

/// Request-level failure kinds.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The catalog has no vehicle matching the selection. Definitive,
    /// not retryable.
    #[error("no vehicle matches the selection")]
    NotFound,

    /// Malformed selection input, rejected before any cache or browser
    /// work.
    #[error("invalid selection: {0}")]
    Validation(String),

    /// Browser/session failure; retrying the lookup later may succeed.
    #[error("resolution failed: {0}")]
    Transient(#[from] ResolveError),

    /// Cache store failure on a path that cannot degrade to a miss.
    #[error("storage failed: {0}")]
    Storage(#[from] vidlookup_core::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "VID not found for the given selection. Please verify your selection criteria.".to_string(),
            ),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Transient(err) => {
                tracing::error!(error = %err, "resolution failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Lookup failed, please try again later.".to_string())
            }
            ApiError::Storage(err) => {
                tracing::error!(error = %err, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Lookup failed, please try again later.".to_string())
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
