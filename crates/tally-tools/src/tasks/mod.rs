//! The five task tools and their shared argument/payload helpers.
//!
//! Message strings and payload shapes here are part of the contract with the
//! model: the system prompt tells it to reproduce the `list_tasks` display
//! block verbatim, and to resolve task numbers to `task_id` values through
//! `list_tasks`.

mod add;
mod complete;
mod delete;
mod list;
mod update;

pub use add::AddTaskTool;
pub use complete::CompleteTaskTool;
pub use delete::DeleteTaskTool;
pub use list::ListTasksTool;
pub use update::UpdateTaskTool;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use tally_store::Task;

/// Payload for a freshly created task.
#[derive(Debug, Serialize)]
pub struct TaskCreated {
    /// Task ID.
    pub task_id: String,
    /// Title as stored.
    pub title: String,
    /// Description as stored.
    pub description: Option<String>,
}

/// Payload describing one task.
#[derive(Debug, Serialize)]
pub struct TaskInfo {
    /// 1-based position within a `list_tasks` page, absent elsewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    /// Task ID.
    pub task_id: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Completion state.
    pub completed: bool,
    /// Priority as a lowercase string.
    pub priority: String,
    /// Due date in ISO format.
    pub due_date: Option<String>,
}

impl TaskInfo {
    fn from_task(task: &Task, number: Option<u32>) -> Self {
        Self {
            number,
            task_id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            completed: task.completed,
            priority: task.priority.to_string(),
            due_date: task.due_date.map(|d| d.to_rfc3339()),
        }
    }
}

/// Get a string argument, treating non-strings as absent.
fn arg_str<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

/// Whether `task_id` looks like one of our task IDs.
fn is_valid_task_id(task_id: &str) -> bool {
    Uuid::parse_str(task_id).is_ok()
}

/// Parse a due date the way users and models tend to write them: RFC 3339
/// (with or without `Z`), a naive datetime, or a bare date (midnight UTC).
fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }
    None
}

/// Render the display block the model is told to reproduce verbatim.
fn render_task_lines(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }
    tasks
        .iter()
        .enumerate()
        .map(|(idx, task)| {
            let status = if task.completed { "✅" } else { "⬜" };
            let desc = task
                .description
                .as_deref()
                .map(|d| format!(" - {d}"))
                .unwrap_or_default();
            let due = task
                .due_date
                .map(|d| format!(" | Due: {}", d.format("%Y-%m-%d")))
                .unwrap_or_default();
            format!(
                "{}. {status} {}{desc} | Priority: {}{due}",
                idx + 1,
                task.title,
                task.priority
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tally_core::enums::{Priority, Recurrence};

    fn sample_task(title: &str, completed: bool) -> Task {
        Task {
            id: Uuid::now_v7().to_string(),
            user_id: "u1".into(),
            title: title.into(),
            description: None,
            completed,
            priority: Priority::Medium,
            due_date: None,
            reminder_time: None,
            recurrence: Recurrence::None,
            parent_id: None,
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn parse_datetime_accepts_common_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 6, 1, 10, 30, 0).unwrap();
        assert_eq!(parse_datetime("2025-06-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_datetime("2025-06-01T10:30:00+00:00"), Some(expected));
        assert_eq!(parse_datetime("2025-06-01T10:30:00"), Some(expected));

        let midnight = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_datetime("2025-06-01"), Some(midnight));

        assert_eq!(parse_datetime("next tuesday"), None);
    }

    #[test]
    fn task_id_validation() {
        assert!(is_valid_task_id(&Uuid::now_v7().to_string()));
        assert!(!is_valid_task_id("42"));
        assert!(!is_valid_task_id(""));
    }

    #[test]
    fn render_empty_list() {
        assert_eq!(render_task_lines(&[]), "No tasks found.");
    }

    #[test]
    fn render_lines_with_all_fields() {
        let mut task = sample_task("Pay rent", false);
        task.description = Some("transfer before noon".into());
        task.priority = Priority::High;
        task.due_date = Some(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());
        let done = sample_task("Call mom", true);

        let lines = render_task_lines(&[task, done]);
        assert_eq!(
            lines,
            "1. ⬜ Pay rent - transfer before noon | Priority: high | Due: 2025-06-01\n\
             2. ✅ Call mom | Priority: medium"
        );
    }

    #[test]
    fn task_info_number_skipped_when_absent() {
        let task = sample_task("x", false);
        let info = TaskInfo::from_task(&task, None);
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("number").is_none());
        assert_eq!(json["priority"], "medium");
    }
}
