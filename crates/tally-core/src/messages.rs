//! Conversation message types shared between the LLM boundary and the runtime.
//!
//! Each role is one variant of a single tagged union — a user message can
//! never carry tool calls and a tool result always names the call it answers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::ToolResponse;

/// A tool call requested by the model.
///
/// `arguments` is the model's serialized argument string, kept verbatim until
/// the agent loop parses it (a parse failure is treated as an empty set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Provider-assigned call ID, echoed back in the tool result message.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
}

/// A message in the model-visible transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    /// Fixed system instruction.
    System {
        /// Instruction text.
        content: String,
    },
    /// End-user turn.
    User {
        /// Message text.
        content: String,
    },
    /// Model turn — text, requested tool calls, or both.
    Assistant {
        /// Reply text, absent on pure tool-call turns.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        /// Tool calls requested in this turn.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallRequest>,
    },
    /// Result of one executed tool call, fed back to the model.
    Tool {
        /// ID of the call this result answers.
        tool_call_id: String,
        /// JSON-serialized [`ToolResponse`] envelope.
        content: String,
    },
}

impl ChatMessage {
    /// Build a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Build an assistant text message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Build a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }
}

/// Record of one executed tool call within an agent turn.
///
/// Persisted on the assistant message as `{tool, arguments, result}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Tool name.
    pub tool: String,
    /// Parsed argument object.
    pub arguments: Value,
    /// The uniform result envelope.
    pub result: ToolResponse,
}
