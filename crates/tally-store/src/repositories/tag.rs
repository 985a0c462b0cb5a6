//! Tag repository — per-user tag rows and task-tag links.

use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use crate::errors::Result;
use crate::types::Tag;

/// Tag repository — stateless, every method takes `&Connection`.
pub struct TagRepo;

impl TagRepo {
    /// Get an existing tag by name, or create it.
    ///
    /// Tag names are unique per user; concurrent creation is resolved by
    /// `INSERT OR IGNORE` followed by a lookup.
    pub fn ensure(conn: &Connection, user_id: &str, name: &str) -> Result<Tag> {
        let id = Uuid::now_v7().to_string();
        let _ = conn.execute(
            "INSERT OR IGNORE INTO tags (id, user_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, user_id, name, chrono::Utc::now()],
        )?;

        let tag = conn.query_row(
            "SELECT id, user_id, name, created_at FROM tags WHERE user_id = ?1 AND name = ?2",
            params![user_id, name],
            Self::map_row,
        )?;
        Ok(tag)
    }

    /// Look up a tag by name.
    pub fn get_by_name(conn: &Connection, user_id: &str, name: &str) -> Result<Option<Tag>> {
        let tag = conn
            .query_row(
                "SELECT id, user_id, name, created_at FROM tags WHERE user_id = ?1 AND name = ?2",
                params![user_id, name],
                Self::map_row,
            )
            .optional()?;
        Ok(tag)
    }

    /// All of a user's tags, ordered by name.
    pub fn list(conn: &Connection, user_id: &str) -> Result<Vec<Tag>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, created_at FROM tags WHERE user_id = ?1 ORDER BY name",
        )?;
        let tags = stmt
            .query_map(params![user_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Delete a tag. Task links go with it; the tasks themselves survive.
    ///
    /// Returns `false` when the tag does not exist for this user.
    pub fn delete(conn: &Connection, user_id: &str, tag_id: &str) -> Result<bool> {
        let rows = conn.execute(
            "DELETE FROM tags WHERE id = ?1 AND user_id = ?2",
            params![tag_id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// Link a tag to a task. Linking twice is a no-op.
    pub fn attach(conn: &Connection, task_id: &str, tag_id: &str) -> Result<()> {
        let _ = conn.execute(
            "INSERT OR IGNORE INTO task_tags (task_id, tag_id) VALUES (?1, ?2)",
            params![task_id, tag_id],
        )?;
        Ok(())
    }

    /// Unlink a tag from a task.
    ///
    /// Returns `false` when no such link existed.
    pub fn detach(conn: &Connection, task_id: &str, tag_id: &str) -> Result<bool> {
        let rows = conn.execute(
            "DELETE FROM task_tags WHERE task_id = ?1 AND tag_id = ?2",
            params![task_id, tag_id],
        )?;
        Ok(rows > 0)
    }

    /// Tags attached to a task, ordered by name.
    pub fn list_for_task(conn: &Connection, task_id: &str) -> Result<Vec<Tag>> {
        let mut stmt = conn.prepare(
            "SELECT t.id, t.user_id, t.name, t.created_at FROM tags t
             JOIN task_tags tt ON tt.tag_id = t.id
             WHERE tt.task_id = ?1
             ORDER BY t.name",
        )?;
        let tags = stmt
            .query_map(params![task_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Replace the tag set on a task with the given names, creating tags
    /// on demand.
    pub fn set_for_task(
        conn: &Connection,
        user_id: &str,
        task_id: &str,
        names: &[String],
    ) -> Result<Vec<Tag>> {
        let _ = conn.execute(
            "DELETE FROM task_tags WHERE task_id = ?1",
            params![task_id],
        )?;

        let mut tags = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let tag = Self::ensure(conn, user_id, name)?;
            let _ = conn.execute(
                "INSERT OR IGNORE INTO task_tags (task_id, tag_id) VALUES (?1, ?2)",
                params![task_id, tag.id],
            )?;
            tags.push(tag);
        }
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tag> {
        Ok(Tag {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
