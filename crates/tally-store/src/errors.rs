//! Error types for the persistence layer.
//!
//! [`StoreError`] is the primary error type returned by all store
//! operations. Validation failures carry the human-readable message that
//! callers surface directly to the assistant.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// JSON serialization/deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// Input failed validation before touching the database.
    #[error("{0}")]
    Validation(String),

    /// Requested task was not found (or belongs to another user).
    #[error("task not found: {0}")]
    TaskNotFound(String),

    /// Requested conversation was not found (or belongs to another user).
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
