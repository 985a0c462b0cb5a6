//! Conversation repository — conversation lifecycle and message history.
//!
//! Appending a message bumps the conversation's `updated_at`, so the
//! conversation list stays ordered by recent activity.

use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use tally_core::enums::MessageRole;

use crate::errors::Result;
use crate::types::{Conversation, Message};

/// Conversation repository — stateless, every method takes `&Connection`.
pub struct ConversationRepo;

impl ConversationRepo {
    /// Create a new conversation.
    pub fn create(conn: &Connection, user_id: &str, title: Option<&str>) -> Result<Conversation> {
        let id = Uuid::now_v7().to_string();
        let now = chrono::Utc::now();

        let _ = conn.execute(
            "INSERT INTO conversations (id, user_id, title, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, user_id, title, now, now],
        )?;

        Ok(Conversation {
            id,
            user_id: user_id.to_string(),
            title: title.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a conversation by ID.
    pub fn get_by_id(
        conn: &Connection,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<Option<Conversation>> {
        let conversation = conn
            .query_row(
                "SELECT id, user_id, title, created_at, updated_at
                 FROM conversations WHERE id = ?1 AND user_id = ?2",
                params![conversation_id, user_id],
                Self::map_row,
            )
            .optional()?;
        Ok(conversation)
    }

    /// List a user's conversations, most recently active first.
    pub fn list(conn: &Connection, user_id: &str) -> Result<Vec<Conversation>> {
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, created_at, updated_at
             FROM conversations WHERE user_id = ?1
             ORDER BY updated_at DESC",
        )?;
        let conversations = stmt
            .query_map(params![user_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(conversations)
    }

    /// Delete a conversation and (via cascade) its messages.
    pub fn delete(conn: &Connection, user_id: &str, conversation_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM conversations WHERE id = ?1 AND user_id = ?2",
            params![conversation_id, user_id],
        )?;
        Ok(changed > 0)
    }

    /// Append a message and bump the conversation's `updated_at`.
    pub fn append_message(
        conn: &Connection,
        conversation_id: &str,
        role: MessageRole,
        content: &str,
        tool_calls: Option<&str>,
    ) -> Result<Message> {
        let id = Uuid::now_v7().to_string();
        let now = chrono::Utc::now();

        let _ = conn.execute(
            "INSERT INTO messages (id, conversation_id, role, content, tool_calls, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, conversation_id, role.as_sql(), content, tool_calls, now],
        )?;
        let _ = conn.execute(
            "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
            params![now, conversation_id],
        )?;

        Ok(Message {
            id,
            conversation_id: conversation_id.to_string(),
            role,
            content: content.to_string(),
            tool_calls: tool_calls.map(String::from),
            created_at: now,
        })
    }

    /// Messages in a conversation, oldest first.
    pub fn list_messages(conn: &Connection, conversation_id: &str) -> Result<Vec<Message>> {
        let mut stmt = conn.prepare(
            "SELECT id, conversation_id, role, content, tool_calls, created_at
             FROM messages WHERE conversation_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;
        let messages = stmt
            .query_map(params![conversation_id], Self::map_message_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(messages)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
        Ok(Conversation {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }

    fn map_message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
        let role_raw: String = row.get(2)?;
        let role = MessageRole::parse(&role_raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("invalid message role: {role_raw}").into(),
            )
        })?;

        Ok(Message {
            id: row.get(0)?,
            conversation_id: row.get(1)?,
            role,
            content: row.get(3)?,
            tool_calls: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
