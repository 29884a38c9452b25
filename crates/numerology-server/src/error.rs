//! Error types for the numerology server.

use axum::http::StatusCode;
use axum::response::Json;
use serde_json::json;
use thiserror::Error;

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors that can occur in the numerology server.
///
/// The calculation core never fails; every error the service can surface is
/// an infrastructure concern owned by this crate.
#[derive(Error, Debug)]
pub enum ServerError {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP server error
    #[error("HTTP server error: {0}")]
    Http(#[from] hyper::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid request content
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The API key header was not sent
    #[error("API key header missing")]
    MissingApiKey,

    /// The API key is unknown or not active
    #[error("Invalid or inactive API key")]
    ForbiddenApiKey,

    /// The per-client request quota is exhausted
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited {
        /// Seconds until the client may retry.
        retry_after_secs: u64,
    },

    /// Server configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Create a new invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a new configuration error.
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The HTTP status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Json(_) | ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::MissingApiKey => StatusCode::UNAUTHORIZED,
            ServerError::ForbiddenApiKey => StatusCode::FORBIDDEN,
            ServerError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ServerError::Http(_) | ServerError::Io(_) | ServerError::Config(_)
            | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// A stable machine-readable label for the error.
    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::Json(_) => "json_error",
            ServerError::Http(_) => "http_error",
            ServerError::Io(_) => "io_error",
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::MissingApiKey => "missing_api_key",
            ServerError::ForbiddenApiKey => "forbidden_api_key",
            ServerError::RateLimited { .. } => "rate_limit_exceeded",
            ServerError::Config(_) => "config_error",
            ServerError::Internal(_) => "internal_error",
        }
    }

    /// The JSON body served alongside this error's status code.
    pub fn body(&self) -> Json<serde_json::Value> {
        Json(json!({
            "error": self.error_type(),
            "details": self.to_string(),
            "timestamp": chrono::Utc::now()
        }))
    }
}
