//! Tool registry — central index of all registered tools.
//!
//! The runtime registers tools at startup, queries the registry to generate
//! the LLM tool schema, and routes each tool call through [`dispatch`].

use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use tally_core::tools::{ToolDefinition, ToolResponse};

use crate::tasks::{AddTaskTool, CompleteTaskTool, DeleteTaskTool, ListTasksTool, UpdateTaskTool};
use crate::traits::{AssistantTool, ToolContext};

/// A tool name collision, rejected at registration time.
#[derive(Debug, thiserror::Error)]
#[error("duplicate tool name: {0}")]
pub struct DuplicateTool(pub String);

/// Central registry mapping tool names to their implementations.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn AssistantTool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Create a registry with the five task tools registered.
    #[must_use]
    pub fn with_task_tools() -> Self {
        let mut registry = Self::new();
        let tools: [Arc<dyn AssistantTool>; 5] = [
            Arc::new(AddTaskTool),
            Arc::new(ListTasksTool),
            Arc::new(CompleteTaskTool),
            Arc::new(UpdateTaskTool),
            Arc::new(DeleteTaskTool),
        ];
        for tool in tools {
            // The built-in names are distinct; a collision here is a
            // programming error.
            if let Err(e) = registry.register(tool) {
                unreachable!("{e}");
            }
        }
        registry
    }

    /// Register a tool. A name collision is rejected, leaving the
    /// registered tool in place.
    pub fn register(&mut self, tool: Arc<dyn AssistantTool>) -> Result<(), DuplicateTool> {
        let name = tool.name().to_owned();
        if self.tools.contains_key(&name) {
            return Err(DuplicateTool(name));
        }
        debug!(tool_name = %name, "tool registered");
        let _ = self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn AssistantTool>> {
        self.tools.get(name).cloned()
    }

    /// Return all tool schemas for the LLM, sorted by name for a stable
    /// request shape.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Return all tool names, sorted alphabetically.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Route one tool call to its implementation.
///
/// An unknown tool name produces a failure envelope, mirroring how every
/// other tool failure is reported back to the model.
pub async fn dispatch(
    registry: &ToolRegistry,
    name: &str,
    args: &Map<String, Value>,
    ctx: &ToolContext,
) -> ToolResponse {
    counter!("tally_tool_calls_total", "tool" => name.to_owned()).increment(1);

    match registry.get(name) {
        Some(tool) => {
            let response = tool.execute(args, ctx).await;
            if !response.success {
                counter!("tally_tool_failures_total", "tool" => name.to_owned()).increment(1);
            }
            response
        }
        None => {
            warn!(tool_name = name, "unknown tool requested");
            ToolResponse::fail(format!("Unknown tool: {name}"))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store::{ConnectionConfig, open_pool};

    fn context() -> (tempfile::TempDir, ToolContext) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.db");
        let pool = open_pool(path.to_str().unwrap(), &ConnectionConfig::default()).unwrap();
        (
            dir,
            ToolContext {
                pool,
                user_id: "u1".into(),
            },
        )
    }

    #[test]
    fn with_task_tools_registers_all_five() {
        let registry = ToolRegistry::with_task_tools();
        assert_eq!(registry.len(), 5);
        assert_eq!(
            registry.names(),
            [
                "add_task",
                "complete_task",
                "delete_task",
                "list_tasks",
                "update_task"
            ]
        );
    }

    #[test]
    fn duplicate_name_is_rejected_and_original_kept() {
        struct ShadowingAddTool;

        #[async_trait::async_trait]
        impl AssistantTool for ShadowingAddTool {
            fn name(&self) -> &str {
                "add_task"
            }

            fn definition(&self) -> ToolDefinition {
                ToolDefinition {
                    name: "add_task".into(),
                    description: "replacement".into(),
                    parameters: serde_json::json!({"type": "object"}),
                }
            }

            async fn execute(&self, _args: &Map<String, Value>, _ctx: &ToolContext) -> ToolResponse {
                ToolResponse::fail("replacement")
            }
        }

        let mut registry = ToolRegistry::with_task_tools();
        let err = registry.register(Arc::new(ShadowingAddTool)).unwrap_err();
        assert_eq!(err.to_string(), "duplicate tool name: add_task");

        assert_eq!(registry.len(), 5);
        let kept = registry.get("add_task").unwrap();
        assert_ne!(kept.definition().description, "replacement");
    }

    #[test]
    fn definitions_are_sorted_and_complete() {
        let registry = ToolRegistry::with_task_tools();
        let definitions = registry.definitions();
        assert_eq!(definitions.len(), 5);
        assert_eq!(definitions[0].name, "add_task");
        assert_eq!(definitions[0].parameters["type"], "object");
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_fails_in_envelope() {
        let (_dir, ctx) = context();
        let registry = ToolRegistry::with_task_tools();
        let response = dispatch(&registry, "fly_to_moon", &Map::new(), &ctx).await;
        assert!(!response.success);
        assert_eq!(response.message, "Unknown tool: fly_to_moon");
    }

    #[tokio::test]
    async fn dispatch_routes_to_registered_tool() {
        let (_dir, ctx) = context();
        let registry = ToolRegistry::with_task_tools();
        let mut args = Map::new();
        let _ = args.insert("title".into(), serde_json::json!("Buy milk"));

        let response = dispatch(&registry, "add_task", &args, &ctx).await;
        assert!(response.success);
        assert_eq!(response.message, "Task 'Buy milk' created successfully.");
    }
}
