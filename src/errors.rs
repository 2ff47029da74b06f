//! Error types for quakemap.
//!
//! Uses `thiserror` for library-style error definitions. Errors that reach
//! the HTTP layer are rendered as a JSON body via [`IntoResponse`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur in quakemap operations.
#[derive(Error, Debug)]
pub enum QuakemapError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// API returned an error status
    #[error("USGS API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid response structure
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Event validation failed
    #[error("Invalid event data: {0}")]
    Validation(String),

    /// Query parameters are inconsistent
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Tier name did not match any severity tier
    #[error("unknown tier: {0}")]
    UnknownTier(String),

    /// No layer group has been created for the tier yet
    #[error("no layer for tier '{0}'")]
    LayerNotFound(String),
}

impl IntoResponse for QuakemapError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UnknownTier(_) | Self::InvalidQuery(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::LayerNotFound(_) => StatusCode::NOT_FOUND,
            Self::Http(_) | Self::Api { .. } | Self::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            Self::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
