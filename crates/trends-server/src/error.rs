//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;
use trends::TrendsError;

/// Error returned by request handlers, rendered as `{"detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request was invalid; maps to 400.
    BadRequest(String),
    /// The request was valid but could not be served; maps to 500.
    Internal(String),
}

impl ApiError {
    /// Classify a pipeline error, prefixing server errors with what failed.
    pub fn fetch(what: &str, err: TrendsError) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal(format!("Failed to fetch {what}: {err}"))
        }
    }

    /// Returns the HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message sent to the client.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::BadRequest(detail) | Self::Internal(detail) => detail,
        }
    }
}

impl From<TrendsError> for ApiError {
    fn from(err: TrendsError) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!(%detail, "Request failed");
        }
        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}
