//! Core tool trait and execution context.

use async_trait::async_trait;
use serde_json::{Map, Value};

use tally_core::tools::{ToolDefinition, ToolResponse};
use tally_store::ConnectionPool;

/// Execution context passed to every tool invocation.
///
/// Tools are scoped to one user; every database operation they perform
/// filters on `user_id`.
#[derive(Clone)]
pub struct ToolContext {
    /// Database connection pool.
    pub pool: ConnectionPool,
    /// User on whose behalf the tool runs.
    pub user_id: String,
}

/// The core trait that every tool must implement.
///
/// [`execute`](AssistantTool::execute) is infallible by design: internal
/// failures are folded into a `success=false` envelope so the model always
/// receives a tool result it can react to.
#[async_trait]
pub trait AssistantTool: Send + Sync {
    /// Tool name — the exact string sent to/from the LLM.
    fn name(&self) -> &str;

    /// Generate the tool schema for the LLM.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with parsed JSON arguments.
    async fn execute(&self, args: &Map<String, Value>, ctx: &ToolContext) -> ToolResponse;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
