//! Error types for the iFinD API client.

use thiserror::Error;
use vantage_traits::VantageError;

/// Errors that can occur when using the iFinD API.
#[derive(Debug, Error)]
pub enum IfindError {
    /// Missing refresh token.
    #[error("IFIND_REFRESH_TOKEN environment variable not set")]
    MissingRefreshToken,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned a non-zero error code.
    #[error("iFinD API error {code}: {message}")]
    Api {
        /// Provider error code.
        code: i64,
        /// Provider error message.
        message: String,
    },

    /// Token exchange returned no access token.
    #[error("Login failed: {0}")]
    Login(String),

    /// Environment variable error.
    #[error("Environment error: {0}")]
    Env(#[from] dotenvy::Error),
}

impl From<IfindError> for VantageError {
    fn from(err: IfindError) -> Self {
        match err {
            IfindError::Json(e) => Self::MalformedData(format!("iFinD response: {e}")),
            other => Self::DataFetch(other.to_string()),
        }
    }
}
