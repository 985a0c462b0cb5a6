//! Chat provider trait and request/response types.
//!
//! The agent loop is provider-agnostic: it builds a [`ChatRequest`] from the
//! transcript and tool definitions, and consumes a [`ChatResponse`] of text
//! and/or tool calls. Implementors must be `Send + Sync` for use across
//! async tasks.

use async_trait::async_trait;

use tally_core::messages::{ChatMessage, ToolCallRequest};
use tally_core::tools::ToolDefinition;

use crate::errors::Result;

/// One chat completion request.
#[derive(Clone, Debug)]
pub struct ChatRequest {
    /// Model ID (e.g. `"gpt-4o-mini"`).
    pub model: String,
    /// Full transcript, system prompt first.
    pub messages: Vec<ChatMessage>,
    /// Tools the model may call. Empty disables tool calling.
    pub tools: Vec<ToolDefinition>,
}

/// One chat completion response.
#[derive(Clone, Debug, Default)]
pub struct ChatResponse {
    /// Reply text, absent on pure tool-call turns.
    pub content: Option<String>,
    /// Tool calls requested by the model.
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ChatResponse {
    /// Whether the model requested any tool calls.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Reply text, trimmed, or `None` when empty.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Core chat provider trait.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run one non-streaming chat completion.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_tool_calls() {
        let mut response = ChatResponse::default();
        assert!(!response.has_tool_calls());

        response.tool_calls.push(ToolCallRequest {
            id: "tc-1".into(),
            name: "add_task".into(),
            arguments: "{}".into(),
        });
        assert!(response.has_tool_calls());
    }

    #[test]
    fn text_trims_and_drops_empty() {
        let response = ChatResponse {
            content: Some("  done  ".into()),
            tool_calls: Vec::new(),
        };
        assert_eq!(response.text(), Some("done"));

        let blank = ChatResponse {
            content: Some("   ".into()),
            tool_calls: Vec::new(),
        };
        assert_eq!(blank.text(), None);

        assert_eq!(ChatResponse::default().text(), None);
    }

    #[test]
    fn chat_provider_is_object_safe() {
        fn assert_object_safe(_: &dyn ChatProvider) {}
        let _ = assert_object_safe;
    }
}
