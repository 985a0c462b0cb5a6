//! Runtime error types.

/// Errors surfaced by the chat orchestrator.
///
/// The agent loop itself is infallible: provider failures are folded into the
/// reply text rather than propagated. What remains here is conversation
/// resolution and persistence.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The requested conversation does not exist for this user.
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    /// Storage error during conversation or message persistence.
    #[error(transparent)]
    Store(#[from] tally_store::StoreError),
}

/// Convenience alias for runtime results.
pub type Result<T> = std::result::Result<T, RuntimeError>;
