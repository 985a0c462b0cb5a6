//! Task repository — CRUD and filtered listing, scoped by user.
//!
//! Every query filters on `user_id`, so a task owned by another user is
//! indistinguishable from a missing one.

use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use tally_core::enums::{Priority, Recurrence};

use crate::errors::Result;
use crate::repositories::tag::TagRepo;
use crate::types::{Task, TaskCreateParams, TaskFilter, TaskListResult, TaskUpdateParams};

const TASK_COLUMNS: &str = "id, user_id, title, description, completed, priority, \
     due_date, reminder_time, recurrence, parent_id, created_at, updated_at";

/// Task repository — stateless, every method takes `&Connection`.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task and attach its tags.
    pub fn create(conn: &Connection, user_id: &str, params: &TaskCreateParams) -> Result<Task> {
        let id = Uuid::now_v7().to_string();
        let now = chrono::Utc::now();

        let _ = conn.execute(
            "INSERT INTO tasks (id, user_id, title, description, completed, priority,
             due_date, reminder_time, recurrence, parent_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                id,
                user_id,
                params.title,
                params.description,
                params.priority.as_sql(),
                params.due_date,
                params.reminder_time,
                params.recurrence.as_sql(),
                params.parent_id,
                now,
                now,
            ],
        )?;

        let tags = if params.tags.is_empty() {
            Vec::new()
        } else {
            TagRepo::set_for_task(conn, user_id, &id, &params.tags)?
        };

        Ok(Task {
            id,
            user_id: user_id.to_string(),
            title: params.title.clone(),
            description: params.description.clone(),
            completed: false,
            priority: params.priority,
            due_date: params.due_date,
            reminder_time: params.reminder_time,
            recurrence: params.recurrence,
            parent_id: params.parent_id.clone(),
            tags,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a task by ID, with tags attached.
    pub fn get_by_id(conn: &Connection, user_id: &str, task_id: &str) -> Result<Option<Task>> {
        let Some(mut task) = Self::fetch(conn, user_id, task_id)? else {
            return Ok(None);
        };
        task.tags = TagRepo::list_for_task(conn, task_id)?;
        Ok(Some(task))
    }

    /// List tasks with filtering and pagination, newest first.
    pub fn list(conn: &Connection, user_id: &str, filter: &TaskFilter) -> Result<TaskListResult> {
        use std::fmt::Write;

        let mut where_sql = String::from("WHERE user_id = ?1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> =
            vec![Box::new(user_id.to_string())];

        if let Some(completed) = filter.completed {
            let _ = write!(where_sql, " AND completed = ?{}", param_values.len() + 1);
            param_values.push(Box::new(completed));
        }
        if let Some(priority) = filter.priority {
            let _ = write!(where_sql, " AND priority = ?{}", param_values.len() + 1);
            param_values.push(Box::new(priority.as_sql().to_string()));
        }
        if let Some(search) = filter.search.as_deref() {
            // Literal substring match: LIKE metacharacters in the term are
            // escaped so "100%" does not act as a wildcard.
            let escaped = search
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            let pattern = format!("%{escaped}%");
            let _ = write!(
                where_sql,
                " AND (title LIKE ?{n} ESCAPE '\\' OR description LIKE ?{n} ESCAPE '\\')",
                n = param_values.len() + 1
            );
            param_values.push(Box::new(pattern));
        }

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(Box::as_ref).collect();

        let total: u64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM tasks {where_sql}"),
            params_refs.as_slice(),
            |row| row.get(0),
        )?;

        let page = filter.page.max(1);
        let offset = u64::from(page - 1) * u64::from(filter.page_size);
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks {where_sql}
             ORDER BY created_at DESC LIMIT {} OFFSET {offset}",
            filter.page_size
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut tasks = stmt
            .query_map(params_refs.as_slice(), Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for task in &mut tasks {
            task.tags = TagRepo::list_for_task(conn, &task.id)?;
        }

        Ok(TaskListResult {
            tasks,
            total,
            page,
            page_size: filter.page_size,
        })
    }

    /// Apply the set fields of `params` to a task. Returns `None` if the
    /// task does not exist (or belongs to another user).
    pub fn update(
        conn: &Connection,
        user_id: &str,
        task_id: &str,
        params: &TaskUpdateParams,
    ) -> Result<Option<Task>> {
        if Self::fetch(conn, user_id, task_id)?.is_none() {
            return Ok(None);
        }

        let mut sets = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(title) = &params.title {
            sets.push(format!("title = ?{}", param_values.len() + 1));
            param_values.push(Box::new(title.clone()));
        }
        if let Some(description) = &params.description {
            sets.push(format!("description = ?{}", param_values.len() + 1));
            param_values.push(Box::new(description.clone()));
        }
        if let Some(priority) = params.priority {
            sets.push(format!("priority = ?{}", param_values.len() + 1));
            param_values.push(Box::new(priority.as_sql().to_string()));
        }
        if let Some(due_date) = params.due_date {
            sets.push(format!("due_date = ?{}", param_values.len() + 1));
            param_values.push(Box::new(due_date));
        }
        if let Some(reminder_time) = params.reminder_time {
            sets.push(format!("reminder_time = ?{}", param_values.len() + 1));
            param_values.push(Box::new(reminder_time));
        }
        if let Some(recurrence) = params.recurrence {
            sets.push(format!("recurrence = ?{}", param_values.len() + 1));
            param_values.push(Box::new(recurrence.as_sql().to_string()));
        }
        if let Some(completed) = params.completed {
            sets.push(format!("completed = ?{}", param_values.len() + 1));
            param_values.push(Box::new(completed));
        }

        if !sets.is_empty() {
            sets.push(format!("updated_at = ?{}", param_values.len() + 1));
            param_values.push(Box::new(chrono::Utc::now()));

            param_values.push(Box::new(task_id.to_string()));
            let id_pos = param_values.len();
            param_values.push(Box::new(user_id.to_string()));
            let user_pos = param_values.len();

            let sql = format!(
                "UPDATE tasks SET {} WHERE id = ?{id_pos} AND user_id = ?{user_pos}",
                sets.join(", ")
            );
            let params_refs: Vec<&dyn rusqlite::types::ToSql> =
                param_values.iter().map(Box::as_ref).collect();
            let _ = conn.execute(&sql, params_refs.as_slice())?;
        }

        if let Some(tags) = &params.tags {
            let _ = TagRepo::set_for_task(conn, user_id, task_id, tags)?;
            if sets.is_empty() {
                let _ = conn.execute(
                    "UPDATE tasks SET updated_at = ?1 WHERE id = ?2 AND user_id = ?3",
                    rusqlite::params![chrono::Utc::now(), task_id, user_id],
                )?;
            }
        }

        Self::get_by_id(conn, user_id, task_id)
    }

    /// Delete a task. Returns whether a row was removed.
    pub fn delete(conn: &Connection, user_id: &str, task_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
            params![task_id, user_id],
        )?;
        Ok(changed > 0)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    fn fetch(conn: &Connection, user_id: &str, task_id: &str) -> Result<Option<Task>> {
        let task = conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"),
                params![task_id, user_id],
                Self::map_row,
            )
            .optional()?;
        Ok(task)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
        let priority_raw: String = row.get(5)?;
        let priority = Priority::parse(&priority_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Text,
                format!("invalid priority: {priority_raw}").into(),
            )
        })?;

        let recurrence_raw: String = row.get(8)?;
        let recurrence = Recurrence::parse(&recurrence_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                8,
                rusqlite::types::Type::Text,
                format!("invalid recurrence: {recurrence_raw}").into(),
            )
        })?;

        Ok(Task {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            completed: row.get(4)?,
            priority,
            due_date: row.get(6)?,
            reminder_time: row.get(7)?,
            recurrence,
            parent_id: row.get(9)?,
            tags: Vec::new(),
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;
    use chrono::{TimeZone, Utc};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        let _ = run_migrations(&conn).unwrap();
        conn
    }

    fn create_simple(conn: &Connection, user_id: &str, title: &str) -> Task {
        TaskRepo::create(
            conn,
            user_id,
            &TaskCreateParams {
                title: title.to_string(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn create_and_get_roundtrip() {
        let conn = setup();
        let due = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let created = TaskRepo::create(
            &conn,
            "u1",
            &TaskCreateParams {
                title: "Pay rent".into(),
                description: Some("First of the month".into()),
                priority: Priority::High,
                due_date: Some(due),
                reminder_time: Some(due - chrono::Duration::hours(1)),
                recurrence: Recurrence::Monthly,
                tags: vec!["bills".into()],
                ..Default::default()
            },
        )
        .unwrap();

        let fetched = TaskRepo::get_by_id(&conn, "u1", &created.id)
            .unwrap()
            .unwrap();
        assert_eq!(fetched.title, "Pay rent");
        assert_eq!(fetched.priority, Priority::High);
        assert_eq!(fetched.recurrence, Recurrence::Monthly);
        assert_eq!(fetched.due_date, Some(due));
        assert!(!fetched.completed);
        assert_eq!(fetched.tags.len(), 1);
        assert_eq!(fetched.tags[0].name, "bills");
    }

    #[test]
    fn get_scoped_by_user() {
        let conn = setup();
        let task = create_simple(&conn, "u1", "mine");
        assert!(TaskRepo::get_by_id(&conn, "u2", &task.id).unwrap().is_none());
    }

    #[test]
    fn list_filters_by_completion_and_priority() {
        let conn = setup();
        let open = create_simple(&conn, "u1", "open task");
        let done = create_simple(&conn, "u1", "done task");
        let _ = TaskRepo::update(
            &conn,
            "u1",
            &done.id,
            &TaskUpdateParams {
                completed: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

        let result = TaskRepo::list(
            &conn,
            "u1",
            &TaskFilter {
                completed: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.tasks[0].id, open.id);

        let result = TaskRepo::list(
            &conn,
            "u1",
            &TaskFilter {
                priority: Some(Priority::High),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(result.total, 0);
    }

    #[test]
    fn list_search_matches_title_and_description() {
        let conn = setup();
        let _ = TaskRepo::create(
            &conn,
            "u1",
            &TaskCreateParams {
                title: "Buy groceries".into(),
                description: Some("milk and eggs".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let _ = create_simple(&conn, "u1", "Walk the dog");

        let by_title = TaskRepo::list(
            &conn,
            "u1",
            &TaskFilter {
                search: Some("groceries".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(by_title.total, 1);

        let by_description = TaskRepo::list(
            &conn,
            "u1",
            &TaskFilter {
                search: Some("eggs".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(by_description.total, 1);
    }

    #[test]
    fn list_search_treats_like_metacharacters_literally() {
        let conn = setup();
        let _ = create_simple(&conn, "u1", "Project 100% done");
        let _ = create_simple(&conn, "u1", "Project 1000 done");
        let _ = create_simple(&conn, "u1", "snake_case rename");
        let _ = create_simple(&conn, "u1", "Welcome note");

        // "%" must not act as a wildcard ("1000" would match otherwise)
        let percent = TaskRepo::list(
            &conn,
            "u1",
            &TaskFilter {
                search: Some("100%".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(percent.total, 1);
        assert_eq!(percent.tasks[0].title, "Project 100% done");

        // "_" must not match an arbitrary character ("Welcome" would match otherwise)
        let underscore = TaskRepo::list(
            &conn,
            "u1",
            &TaskFilter {
                search: Some("e_c".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(underscore.total, 1);
        assert_eq!(underscore.tasks[0].title, "snake_case rename");
    }

    #[test]
    fn list_caps_a_page_at_the_default_page_size() {
        let conn = setup();
        for i in 0..101 {
            let _ = create_simple(&conn, "u1", &format!("task {i}"));
        }

        let result = TaskRepo::list(&conn, "u1", &TaskFilter::default()).unwrap();
        assert_eq!(result.total, 101);
        assert_eq!(result.tasks.len(), 100);

        let second_page = TaskRepo::list(
            &conn,
            "u1",
            &TaskFilter {
                page: 2,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(second_page.tasks.len(), 1);
    }

    #[test]
    fn list_paginates_with_total() {
        let conn = setup();
        for i in 0..5 {
            let _ = create_simple(&conn, "u1", &format!("task {i}"));
        }

        let page = TaskRepo::list(
            &conn,
            "u1",
            &TaskFilter {
                page: 2,
                page_size: 2,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.tasks.len(), 2);
        assert_eq!(page.page, 2);
    }

    #[test]
    fn update_unknown_task_is_none() {
        let conn = setup();
        let result = TaskRepo::update(
            &conn,
            "u1",
            "missing",
            &TaskUpdateParams {
                title: Some("x".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn update_replaces_tags() {
        let conn = setup();
        let task = TaskRepo::create(
            &conn,
            "u1",
            &TaskCreateParams {
                title: "tagged".into(),
                tags: vec!["old".into()],
                ..Default::default()
            },
        )
        .unwrap();

        let updated = TaskRepo::update(
            &conn,
            "u1",
            &task.id,
            &TaskUpdateParams {
                tags: Some(vec!["new".into()]),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.tags.len(), 1);
        assert_eq!(updated.tags[0].name, "new");
    }

    #[test]
    fn delete_scoped_by_user() {
        let conn = setup();
        let task = create_simple(&conn, "u1", "doomed");
        assert!(!TaskRepo::delete(&conn, "u2", &task.id).unwrap());
        assert!(TaskRepo::delete(&conn, "u1", &task.id).unwrap());
        assert!(TaskRepo::get_by_id(&conn, "u1", &task.id).unwrap().is_none());
    }
}
