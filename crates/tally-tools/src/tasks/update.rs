//! `update_task` — apply a partial update to a task.

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use tally_core::enums::Priority;
use tally_core::tools::{ToolDefinition, ToolResponse};
use tally_store::{TaskUpdateParams, service::TaskService};

use super::{TaskInfo, arg_str, is_valid_task_id, parse_datetime};
use crate::traits::{AssistantTool, ToolContext};

/// Update a task's title, description, priority, or due date.
pub struct UpdateTaskTool;

#[async_trait]
impl AssistantTool for UpdateTaskTool {
    fn name(&self) -> &str {
        "update_task"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "update_task".into(),
            description: "Update task title, description, priority, or due date".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "task_id": {"type": "string", "description": "Task UUID"},
                    "title": {"type": "string", "description": "New title"},
                    "description": {"type": "string", "description": "New description"},
                    "priority": {
                        "type": "string",
                        "enum": ["high", "medium", "low"],
                        "description": "New priority"
                    },
                    "due_date": {"type": "string", "description": "New due date in ISO format"},
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

        let mut params = TaskUpdateParams {
            title: arg_str(args, "title").map(String::from),
            description: arg_str(args, "description").map(String::from),
            ..Default::default()
        };
        if let Some(raw) = arg_str(args, "priority") {
            match Priority::parse(raw) {
                Some(priority) => params.priority = Some(priority),
                None => return ToolResponse::fail(format!("Invalid priority: {raw}")),
            }
        }
        if let Some(raw) = arg_str(args, "due_date") {
            match parse_datetime(raw) {
                Some(due) => params.due_date = Some(due),
                None => return ToolResponse::fail(format!("Invalid due_date: {raw}")),
            }
        }

        if params.is_empty() {
            return ToolResponse::fail("No fields to update.");
        }

        let conn = match ctx.pool.get() {
            Ok(conn) => conn,
            Err(e) => return ToolResponse::fail(format!("Failed to update task: {e}")),
        };

        match TaskService::update_task(&conn, &ctx.user_id, task_id, &params) {
            Ok(None) => ToolResponse::fail(format!("Task not found: {task_id}")),
            Ok(Some(task)) => ToolResponse::ok_with(
                format!("Task '{}' updated.", task.title),
                json!(TaskInfo::from_task(&task, None)),
            ),
            Err(e) => ToolResponse::fail(format!("Failed to update task: {e}")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
