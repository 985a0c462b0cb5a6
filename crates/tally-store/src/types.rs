//! Row types and parameter structs for the persistence layer.
//!
//! Timestamps are stored as RFC 3339 `TEXT` and surface as
//! [`DateTime<Utc>`]. Serde output uses camelCase since these types flow
//! straight into tool response payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tally_core::enums::{MessageRole, Priority, Recurrence};

/// A task row, with its tags attached.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task ID (UUIDv7).
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Task title (at most 255 characters).
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Whether the task has been completed.
    pub completed: bool,
    /// Task priority.
    pub priority: Priority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional reminder time (at or before the due date).
    pub reminder_time: Option<DateTime<Utc>>,
    /// Recurrence rule.
    pub recurrence: Recurrence,
    /// For recurring successors, the task this one was spawned from.
    pub parent_id: Option<String>,
    /// Tags attached to this task.
    pub tags: Vec<Tag>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A tag, unique per user by name.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Tag ID (UUIDv7).
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Tag name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A conversation row.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Conversation ID (UUIDv7).
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Optional display title.
    pub title: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Bumped on every appended message.
    pub updated_at: DateTime<Utc>,
}

/// A persisted chat message.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message ID (UUIDv7).
    pub id: String,
    /// Conversation this message belongs to.
    pub conversation_id: String,
    /// Author role.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
    /// JSON-encoded tool invocation records, if any.
    pub tool_calls: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a task.
#[derive(Clone, Debug, Default)]
pub struct TaskCreateParams {
    /// Task title (required, at most 255 characters).
    pub title: String,
    /// Optional description (at most 5000 characters).
    pub description: Option<String>,
    /// Priority (defaults to medium).
    pub priority: Priority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional reminder time.
    pub reminder_time: Option<DateTime<Utc>>,
    /// Recurrence rule (defaults to none).
    pub recurrence: Recurrence,
    /// For recurring successors, the completed task that spawned this one.
    pub parent_id: Option<String>,
    /// Tag names to attach (created on demand).
    pub tags: Vec<String>,
}

/// Fields for updating a task. `None` means "leave unchanged".
#[derive(Clone, Debug, Default)]
pub struct TaskUpdateParams {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New due date.
    pub due_date: Option<DateTime<Utc>>,
    /// New reminder time.
    pub reminder_time: Option<DateTime<Utc>>,
    /// New recurrence rule.
    pub recurrence: Option<Recurrence>,
    /// New completion state.
    pub completed: Option<bool>,
    /// Replacement tag set.
    pub tags: Option<Vec<String>>,
}

impl TaskUpdateParams {
    /// True when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.reminder_time.is_none()
            && self.recurrence.is_none()
            && self.completed.is_none()
            && self.tags.is_none()
    }
}

/// Filters and pagination for listing tasks.
#[derive(Clone, Debug)]
pub struct TaskFilter {
    /// Filter by completion state.
    pub completed: Option<bool>,
    /// Filter by priority.
    pub priority: Option<Priority>,
    /// Case-insensitive substring match on title or description.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: u32,
    /// Results per page.
    pub page_size: u32,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            completed: None,
            priority: None,
            search: None,
            page: 1,
            page_size: 100,
        }
    }
}

/// A page of tasks plus the unpaginated total.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListResult {
    /// Tasks on this page, newest first.
    pub tasks: Vec<Task>,
    /// Total matching tasks across all pages.
    pub total: u64,
    /// Page that was fetched.
    pub page: u32,
    /// Page size that was used.
    pub page_size: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
