//! `add_task` — create a new task.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::debug;

use tally_core::enums::Priority;
use tally_core::tools::{ToolDefinition, ToolResponse};
use tally_store::{TaskCreateParams, service::TaskService};

use super::{TaskCreated, arg_str, parse_datetime};
use crate::traits::{AssistantTool, ToolContext};

/// Create a new task for the user.
pub struct AddTaskTool;

#[async_trait]
impl AssistantTool for AddTaskTool {
    fn name(&self) -> &str {
        "add_task"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "add_task".into(),
            description: "Create a new todo task for the user".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string", "description": "Task title (required)"},
                    "description": {"type": "string", "description": "Task description"},
                    "priority": {
                        "type": "string",
                        "enum": ["high", "medium", "low"],
                        "description": "Task priority"
                    },
                    "due_date": {"type": "string", "description": "Due date in ISO format"},
                },
                "required": ["title"],
            }),
        }
    }

    async fn execute(&self, args: &Map<String, Value>, ctx: &ToolContext) -> ToolResponse {
        let Some(title) = arg_str(args, "title") else {
            return ToolResponse::fail("Failed to create task: missing required field 'title'");
        };
        let description = arg_str(args, "description").map(String::from);

        // absent or unrecognized priority falls back to medium
        let priority = arg_str(args, "priority")
            .and_then(Priority::parse)
            .unwrap_or_default();

        let due_date = match arg_str(args, "due_date") {
            Some(raw) => match parse_datetime(raw) {
                Some(parsed) => Some(parsed),
                None => {
                    return ToolResponse::fail(format!(
                        "Invalid due_date format: {raw}. Use ISO format."
                    ));
                }
            },
            None => None,
        };

        let conn = match ctx.pool.get() {
            Ok(conn) => conn,
            Err(e) => return ToolResponse::fail(format!("Failed to create task: {e}")),
        };

        match TaskService::create_task(
            &conn,
            &ctx.user_id,
            &TaskCreateParams {
                title: title.to_string(),
                description,
                priority,
                due_date,
                ..Default::default()
            },
        ) {
            Ok(task) => {
                debug!(task_id = %task.id, "task created");
                ToolResponse::ok_with(
                    format!("Task '{title}' created successfully."),
                    json!(TaskCreated {
                        task_id: task.id,
                        title: task.title,
                        description: task.description,
                    }),
                )
            }
            Err(e) => ToolResponse::fail(format!("Failed to create task: {e}")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
