//! Tool catalog entries and the uniform response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool exposed to the model.
///
/// `parameters` is a JSON Schema object; its property names and enum values
/// are part of the wire contract with the model provider and must match what
/// the tool implementation expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON Schema for the arguments object.
    pub parameters: Value,
}

/// The uniform envelope returned by every tool operation.
///
/// Failures are data, never errors: the agent loop serializes this envelope
/// back to the model as a tool result regardless of `success`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable text, displayed verbatim where noted.
    pub message: String,
    /// Optional structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolResponse {
    /// Successful result without a payload.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    /// Successful result with a structured payload.
    #[must_use]
    pub fn ok_with(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Failed result. Never thrown — always carried back as data.
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}
