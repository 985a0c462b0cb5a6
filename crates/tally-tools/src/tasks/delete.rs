//! `delete_task` — permanently remove a task.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::debug;

use tally_core::tools::{ToolDefinition, ToolResponse};
use tally_store::service::TaskService;

use super::{arg_str, is_valid_task_id};
use crate::traits::{AssistantTool, ToolContext};

/// Delete a task. The system prompt requires the model to confirm with the
/// user before calling this.
pub struct DeleteTaskTool;

#[async_trait]
impl AssistantTool for DeleteTaskTool {
    fn name(&self) -> &str {
        "delete_task"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "delete_task".into(),
            description: "Delete a task permanently. Cannot be undone.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "task_id": {"type": "string", "description": "Task UUID"},
                },
                "required": ["task_id"],
            }),
        }
    }

    async fn execute(&self, args: &Map<String, Value>, ctx: &ToolContext) -> ToolResponse {
        let task_id = arg_str(args, "task_id").unwrap_or_default();
        if !is_valid_task_id(task_id) {
            return ToolResponse::fail(format!("Invalid task ID: {task_id}"));
        }

        let conn = match ctx.pool.get() {
            Ok(conn) => conn,
            Err(e) => return ToolResponse::fail(format!("Failed to delete task: {e}")),
        };

        // fetch first so the confirmation message can name the task
        let task = match TaskService::get_task(&conn, &ctx.user_id, task_id) {
            Ok(Some(task)) => task,
            Ok(None) => return ToolResponse::fail(format!("Task not found: {task_id}")),
            Err(e) => return ToolResponse::fail(format!("Failed to delete task: {e}")),
        };

        match TaskService::delete_task(&conn, &ctx.user_id, task_id) {
            Ok(true) => {
                debug!(%task_id, "task deleted");
                ToolResponse::ok(format!("Task '{}' deleted.", task.title))
            }
            Ok(false) => ToolResponse::fail(format!("Task not found: {task_id}")),
            Err(e) => ToolResponse::fail(format!("Failed to delete task: {e}")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
