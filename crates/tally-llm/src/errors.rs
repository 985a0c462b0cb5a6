//! Error types for the LLM boundary.

use thiserror::Error;

/// Errors that can occur during chat completion.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider returned an API error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or error description.
        message: String,
    },

    /// Response was 2xx but did not have the expected shape.
    #[error("invalid response: {message}")]
    InvalidResponse {
        /// What was missing or malformed.
        message: String,
    },
}

/// Convenience type alias for LLM results.
pub type Result<T> = std::result::Result<T, LlmError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
