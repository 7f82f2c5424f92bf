//! Error types for the directory provider and runtime configuration.
//!
//! Search outcomes such as "no matches" or "phrase too short" are not errors;
//! they are modelled by [`crate::pipeline::Outcome`]. The errors here cover
//! configuration problems and failures talking to the Slack Web API.

use thiserror::Error;

/// Errors that can occur while loading configuration or querying the directory.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Configuration error (missing or invalid config).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication error (invalid token, revoked, etc.).
    #[error("Authentication error: {0}")]
    Auth(String),

    /// API request failed.
    #[error("Slack API error: {0}")]
    Api(String),

    /// API rate limited.
    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// Operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid payload received from Slack.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DirectoryError::Timeout(err.to_string())
        } else if err.is_connect() {
            DirectoryError::Network(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            DirectoryError::InvalidPayload(err.to_string())
        } else {
            DirectoryError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DirectoryError {
    fn from(err: serde_json::Error) -> Self {
        DirectoryError::Json(err.to_string())
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;

/// An `ok: false` response from the Slack Web API.
#[derive(Debug, Clone)]
pub struct SlackApiError {
    /// Error code from Slack (e.g., "invalid_auth").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl SlackApiError {
    /// Create a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<SlackApiError> for DirectoryError {
    fn from(err: SlackApiError) -> Self {
        match err.code.as_str() {
            // Slack does not say how long to wait in the body
            "ratelimited" | "rate_limited" => DirectoryError::RateLimited {
                retry_after_secs: 30,
            },
            "invalid_auth" | "not_authed" | "account_inactive" | "token_revoked"
            | "missing_scope" => DirectoryError::Auth(err.message),
            _ => DirectoryError::Api(format!("{}: {}", err.code, err.message)),
        }
    }
}
