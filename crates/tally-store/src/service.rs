//! Task service — validation and recurrence-aware completion on top of the
//! repositories.
//!
//! Completing a recurring task with a due date spawns a successor task: same
//! title, description, priority, recurrence, and tags, with the due date
//! advanced by one interval and the reminder keeping its offset from the due
//! date. The successor records the completed task as its `parent_id`.

use rusqlite::Connection;
use tracing::debug;

use tally_core::recurrence::{next_due_date, next_reminder_time};

use crate::errors::{Result, StoreError};
use crate::repositories::task::TaskRepo;
use crate::types::{Task, TaskCreateParams, TaskFilter, TaskListResult, TaskUpdateParams};

/// Maximum title length in characters.
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Result of completing a task.
#[derive(Clone, Debug)]
pub struct CompletionOutcome {
    /// The task, in its post-completion state.
    pub task: Task,
    /// Successor created for a recurring task, if any.
    pub successor: Option<Task>,
    /// True when the task was already completed and nothing changed.
    pub already_completed: bool,
}

/// Task service — stateless, every method takes `&Connection`.
pub struct TaskService;

impl TaskService {
    /// Validate and create a task.
    #[tracing::instrument(skip_all, fields(user_id))]
    pub fn create_task(
        conn: &Connection,
        user_id: &str,
        params: &TaskCreateParams,
    ) -> Result<Task> {
        let title = params.title.trim();
        validate_title(title)?;
        validate_description(params.description.as_deref())?;
        validate_reminder(params.reminder_time, params.due_date)?;

        let params = TaskCreateParams {
            title: title.to_string(),
            ..params.clone()
        };
        TaskRepo::create(conn, user_id, &params)
    }

    /// Get a task by ID.
    pub fn get_task(conn: &Connection, user_id: &str, task_id: &str) -> Result<Option<Task>> {
        TaskRepo::get_by_id(conn, user_id, task_id)
    }

    /// List tasks with filtering and pagination.
    pub fn list_tasks(
        conn: &Connection,
        user_id: &str,
        filter: &TaskFilter,
    ) -> Result<TaskListResult> {
        if filter.page_size == 0 {
            return Err(StoreError::Validation(
                "Page size must be at least 1".into(),
            ));
        }
        TaskRepo::list(conn, user_id, filter)
    }

    /// Validate and apply a partial update. Returns `None` if the task does
    /// not exist.
    #[tracing::instrument(skip_all, fields(user_id, task_id))]
    pub fn update_task(
        conn: &Connection,
        user_id: &str,
        task_id: &str,
        params: &TaskUpdateParams,
    ) -> Result<Option<Task>> {
        let Some(existing) = TaskRepo::get_by_id(conn, user_id, task_id)? else {
            return Ok(None);
        };

        let mut params = params.clone();
        if let Some(title) = &params.title {
            let title = title.trim();
            validate_title(title)?;
            params.title = Some(title.to_string());
        }
        validate_description(params.description.as_deref())?;

        // cross-field check uses the stored value for whichever side the
        // update leaves unchanged
        let effective_due = params.due_date.or(existing.due_date);
        let effective_reminder = params.reminder_time.or(existing.reminder_time);
        if params.due_date.is_some() || params.reminder_time.is_some() {
            validate_reminder(effective_reminder, effective_due)?;
        }

        TaskRepo::update(conn, user_id, task_id, &params)
    }

    /// Mark a task completed, creating the next occurrence for recurring
    /// tasks. Returns `None` if the task does not exist.
    #[tracing::instrument(skip_all, fields(user_id, task_id))]
    pub fn complete_task(
        conn: &Connection,
        user_id: &str,
        task_id: &str,
    ) -> Result<Option<CompletionOutcome>> {
        let Some(task) = TaskRepo::get_by_id(conn, user_id, task_id)? else {
            return Ok(None);
        };

        if task.completed {
            return Ok(Some(CompletionOutcome {
                task,
                successor: None,
                already_completed: true,
            }));
        }

        let Some(completed) = TaskRepo::update(
            conn,
            user_id,
            task_id,
            &TaskUpdateParams {
                completed: Some(true),
                ..Default::default()
            },
        )?
        else {
            return Ok(None);
        };

        let successor = if completed.recurrence.is_recurring() && completed.due_date.is_some() {
            Some(Self::spawn_successor(conn, user_id, &completed)?)
        } else {
            None
        };

        Ok(Some(CompletionOutcome {
            task: completed,
            successor,
            already_completed: false,
        }))
    }

    /// Reopen a completed task. Returns `None` if the task does not exist.
    pub fn reopen_task(conn: &Connection, user_id: &str, task_id: &str) -> Result<Option<Task>> {
        TaskRepo::update(
            conn,
            user_id,
            task_id,
            &TaskUpdateParams {
                completed: Some(false),
                ..Default::default()
            },
        )
    }

    /// Delete a task. Returns whether a row was removed.
    #[tracing::instrument(skip_all, fields(user_id, task_id))]
    pub fn delete_task(conn: &Connection, user_id: &str, task_id: &str) -> Result<bool> {
        TaskRepo::delete(conn, user_id, task_id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    fn spawn_successor(conn: &Connection, user_id: &str, completed: &Task) -> Result<Task> {
        // caller guarantees due_date is present
        let Some(current_due) = completed.due_date else {
            return Err(StoreError::Validation(
                "recurring task has no due date".into(),
            ));
        };

        let next_due = next_due_date(completed.recurrence, current_due);
        let next_reminder = completed
            .reminder_time
            .map(|reminder| next_reminder_time(current_due, reminder, next_due));

        debug!(
            task_id = %completed.id,
            recurrence = %completed.recurrence,
            %next_due,
            "spawning next occurrence"
        );

        TaskRepo::create(
            conn,
            user_id,
            &TaskCreateParams {
                title: completed.title.clone(),
                description: completed.description.clone(),
                priority: completed.priority,
                due_date: Some(next_due),
                reminder_time: next_reminder,
                recurrence: completed.recurrence,
                parent_id: Some(completed.id.clone()),
                tags: completed.tags.iter().map(|t| t.name.clone()).collect(),
            },
        )
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(StoreError::Validation("Title cannot be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(StoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<()> {
    if let Some(description) = description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(StoreError::Validation(format!(
                "Description must be at most {MAX_DESCRIPTION_LEN} characters"
            )));
        }
    }
    Ok(())
}

fn validate_reminder(
    reminder: Option<chrono::DateTime<chrono::Utc>>,
    due: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<()> {
    if let (Some(reminder), Some(due)) = (reminder, due) {
        if reminder > due {
            return Err(StoreError::Validation(
                "Reminder time must be at or before the due date".into(),
            ));
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use chrono::{Duration, TimeZone, Utc};
    use tally_core::enums::{Priority, Recurrence};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        let _ = run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn create_trims_and_validates_title() {
        let conn = setup();
        let task = TaskService::create_task(
            &conn,
            "u1",
            &TaskCreateParams {
                title: "  Buy milk  ".into(),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(task.title, "Buy milk");

        let err = TaskService::create_task(
            &conn,
            "u1",
            &TaskCreateParams {
                title: "   ".into(),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn create_rejects_overlong_title() {
        let conn = setup();
        let err = TaskService::create_task(
            &conn,
            "u1",
            &TaskCreateParams {
                title: "x".repeat(256),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn create_rejects_reminder_after_due() {
        let conn = setup();
        let due = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let err = TaskService::create_task(
            &conn,
            "u1",
            &TaskCreateParams {
                title: "t".into(),
                due_date: Some(due),
                reminder_time: Some(due + Duration::hours(1)),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn complete_non_recurring_has_no_successor() {
        let conn = setup();
        let task = TaskService::create_task(
            &conn,
            "u1",
            &TaskCreateParams {
                title: "one-shot".into(),
                due_date: Some(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()),
                ..Default::default()
            },
        )
        .unwrap();

        let outcome = TaskService::complete_task(&conn, "u1", &task.id)
            .unwrap()
            .unwrap();
        assert!(outcome.task.completed);
        assert!(outcome.successor.is_none());
        assert!(!outcome.already_completed);
    }

    #[test]
    fn complete_recurring_spawns_successor() {
        let conn = setup();
        let due = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let reminder = due - Duration::hours(2);
        let task = TaskService::create_task(
            &conn,
            "u1",
            &TaskCreateParams {
                title: "water plants".into(),
                priority: Priority::Low,
                due_date: Some(due),
                reminder_time: Some(reminder),
                recurrence: Recurrence::Weekly,
                tags: vec!["home".into()],
                ..Default::default()
            },
        )
        .unwrap();

        let outcome = TaskService::complete_task(&conn, "u1", &task.id)
            .unwrap()
            .unwrap();
        let successor = outcome.successor.unwrap();
        assert_eq!(successor.title, "water plants");
        assert_eq!(successor.due_date, Some(due + Duration::days(7)));
        assert_eq!(successor.reminder_time, Some(reminder + Duration::days(7)));
        assert_eq!(successor.parent_id.as_deref(), Some(task.id.as_str()));
        assert!(!successor.completed);
        assert_eq!(successor.tags.len(), 1);
        assert_eq!(successor.tags[0].name, "home");
    }

    #[test]
    fn complete_recurring_without_due_date_has_no_successor() {
        let conn = setup();
        let task = TaskService::create_task(
            &conn,
            "u1",
            &TaskCreateParams {
                title: "undated habit".into(),
                recurrence: Recurrence::Daily,
                ..Default::default()
            },
        )
        .unwrap();

        let outcome = TaskService::complete_task(&conn, "u1", &task.id)
            .unwrap()
            .unwrap();
        assert!(outcome.successor.is_none());
    }

    #[test]
    fn complete_twice_reports_already_completed() {
        let conn = setup();
        let due = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let task = TaskService::create_task(
            &conn,
            "u1",
            &TaskCreateParams {
                title: "daily".into(),
                due_date: Some(due),
                recurrence: Recurrence::Daily,
                ..Default::default()
            },
        )
        .unwrap();

        let first = TaskService::complete_task(&conn, "u1", &task.id)
            .unwrap()
            .unwrap();
        assert!(first.successor.is_some());

        // completing again must not spawn another occurrence
        let second = TaskService::complete_task(&conn, "u1", &task.id)
            .unwrap()
            .unwrap();
        assert!(second.already_completed);
        assert!(second.successor.is_none());

        let all = TaskService::list_tasks(&conn, "u1", &TaskFilter::default()).unwrap();
        assert_eq!(all.total, 2);
    }

    #[test]
    fn complete_unknown_task_is_none() {
        let conn = setup();
        assert!(
            TaskService::complete_task(&conn, "u1", "missing")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn update_cross_checks_reminder_against_stored_due() {
        let conn = setup();
        let due = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let task = TaskService::create_task(
            &conn,
            "u1",
            &TaskCreateParams {
                title: "t".into(),
                due_date: Some(due),
                ..Default::default()
            },
        )
        .unwrap();

        let err = TaskService::update_task(
            &conn,
            "u1",
            &task.id,
            &TaskUpdateParams {
                reminder_time: Some(due + Duration::hours(1)),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn reopen_clears_completed() {
        let conn = setup();
        let task = TaskService::create_task(
            &conn,
            "u1",
            &TaskCreateParams {
                title: "t".into(),
                ..Default::default()
            },
        )
        .unwrap();
        let _ = TaskService::complete_task(&conn, "u1", &task.id).unwrap();

        let reopened = TaskService::reopen_task(&conn, "u1", &task.id)
            .unwrap()
            .unwrap();
        assert!(!reopened.completed);
    }

    #[test]
    fn list_rejects_zero_page_size() {
        let conn = setup();
        let err = TaskService::list_tasks(
            &conn,
            "u1",
            &TaskFilter {
                page_size: 0,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
