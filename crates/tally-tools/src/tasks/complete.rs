//! `complete_task` — mark a task done, spawning the next occurrence for
//! recurring tasks.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::debug;

use tally_core::tools::{ToolDefinition, ToolResponse};
use tally_store::service::TaskService;

use super::{TaskInfo, arg_str, is_valid_task_id};
use crate::traits::{AssistantTool, ToolContext};

/// Mark a task as completed.
pub struct CompleteTaskTool;

#[async_trait]
impl AssistantTool for CompleteTaskTool {
    fn name(&self) -> &str {
        "complete_task"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "complete_task".into(),
            description: "Mark a task as completed".into(),
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
            Err(e) => return ToolResponse::fail(format!("Failed to complete task: {e}")),
        };

        match TaskService::complete_task(&conn, &ctx.user_id, task_id) {
            Ok(None) => ToolResponse::fail(format!("Task not found: {task_id}")),
            Ok(Some(outcome)) => {
                if outcome.already_completed {
                    return ToolResponse::ok(format!(
                        "Task '{}' is already completed.",
                        outcome.task.title
                    ));
                }

                let mut message = format!("Task '{}' marked as completed.", outcome.task.title);
                if let Some(successor) = &outcome.successor {
                    debug!(successor_id = %successor.id, "next occurrence created");
                    message.push_str(" Next occurrence created.");
                }
                ToolResponse::ok_with(message, json!(TaskInfo::from_task(&outcome.task, None)))
            }
            Err(e) => ToolResponse::fail(format!("Failed to complete task: {e}")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
