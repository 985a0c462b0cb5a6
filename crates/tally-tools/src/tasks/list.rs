//! `list_tasks` — filtered task listing with a pre-rendered display block.

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use tally_core::enums::Priority;
use tally_core::tools::{ToolDefinition, ToolResponse};
use tally_store::{TaskFilter, service::TaskService};

use super::{TaskInfo, arg_str, render_task_lines};
use crate::traits::{AssistantTool, ToolContext};

/// List the user's tasks with optional filters.
pub struct ListTasksTool;

#[async_trait]
impl AssistantTool for ListTasksTool {
    fn name(&self) -> &str {
        "list_tasks"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "list_tasks".into(),
            description: "List all tasks with optional filters".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "status": {
                        "type": "string",
                        "enum": ["all", "completed", "pending"],
                        "description": "Filter by status"
                    },
                    "priority": {
                        "type": "string",
                        "enum": ["high", "medium", "low"],
                        "description": "Filter by priority"
                    },
                    "search": {"type": "string", "description": "Search term"},
                },
                "required": [],
            }),
        }
    }

    async fn execute(&self, args: &Map<String, Value>, ctx: &ToolContext) -> ToolResponse {
        let completed = match arg_str(args, "status") {
            Some("completed") => Some(true),
            Some("pending") => Some(false),
            _ => None,
        };
        // an unrecognized priority filter is silently ignored
        let priority = arg_str(args, "priority").and_then(Priority::parse);
        let search = arg_str(args, "search").map(String::from);

        let filter = TaskFilter {
            completed,
            priority,
            search,
            ..Default::default()
        };

        let conn = match ctx.pool.get() {
            Ok(conn) => conn,
            Err(e) => return ToolResponse::fail(format!("Failed to list tasks: {e}")),
        };

        match TaskService::list_tasks(&conn, &ctx.user_id, &filter) {
            Ok(result) => {
                let infos: Vec<TaskInfo> = result
                    .tasks
                    .iter()
                    .enumerate()
                    .map(|(idx, task)| {
                        TaskInfo::from_task(task, Some(u32::try_from(idx + 1).unwrap_or(u32::MAX)))
                    })
                    .collect();
                let display = render_task_lines(&result.tasks);

                ToolResponse::ok_with(
                    format!(
                        "Found {} task(s). Display this exactly:\n{display}",
                        result.total
                    ),
                    json!({"tasks": infos, "total": result.total}),
                )
            }
            Err(e) => ToolResponse::fail(format!("Failed to list tasks: {e}")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
