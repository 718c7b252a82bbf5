//! Error types for Kamiwaza Scout
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// Every variant maps to a fixed HTTP status and a `{ "error": ... }` body.
/// Upstream failures are caught at the handler boundary and end up here;
/// nothing is retried.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Authentication required (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Login failed for any reason (401)
    ///
    /// Bad credentials, an unreachable identity provider and a malformed
    /// request body all produce the same message.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Missing or invalid input (400)
    #[error("{0}")]
    Validation(String),

    /// Competitor search failed (500)
    #[error("Failed to perform search | {0}")]
    Search(String),

    /// Upstream service returned an unusable response (502)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// HTTP client error (502)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Model catalog is empty (503)
    #[error("No models available")]
    NoModels,

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Status code and metric label for this error
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::AuthenticationFailed => {
                (StatusCode::UNAUTHORIZED, "authentication_failed")
            }
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            AppError::Search(_) => (StatusCode::INTERNAL_SERVER_ERROR, "search"),
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream"),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, "http_client"),
            AppError::NoModels => (StatusCode::SERVICE_UNAVAILABLE, "no_models"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }

    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        self.classify().0
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to appropriate HTTP status code
    /// and JSON error body.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_type) = self.classify();
        let error_message = match &self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Internal(error) => {
                tracing::error!(%error, "Internal error");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
