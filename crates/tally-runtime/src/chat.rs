//! Chat orchestration — conversation persistence around the agent loop.
//!
//! The user message is persisted before the provider is ever called, so a
//! crash mid-turn never loses what the user said. The assistant reply is
//! persisted afterwards with its tool invocation records attached.

use tracing::{instrument, warn};

use tally_core::enums::MessageRole;
use tally_core::messages::{ChatMessage, ToolInvocation};
use tally_store::{ConnectionPool, Conversation, ConversationRepo, Message, StoreError};
use tally_tools::ToolContext;

use crate::agent::Agent;
use crate::errors::{Result, RuntimeError};

/// Result of one chat exchange.
#[derive(Debug)]
pub struct ChatOutcome {
    /// Conversation the exchange was recorded in (created if none was given).
    pub conversation_id: String,
    /// Assistant reply text.
    pub reply: String,
    /// Tool invocations executed during the turn.
    pub tool_calls: Vec<ToolInvocation>,
}

/// Conversation-aware front door to the agent.
pub struct ChatService {
    pool: ConnectionPool,
    agent: Agent,
}

impl ChatService {
    /// Create a chat service over a pool and a configured agent.
    #[must_use]
    pub fn new(pool: ConnectionPool, agent: Agent) -> Self {
        Self { pool, agent }
    }

    /// Process one user message in a conversation.
    ///
    /// With `conversation_id` absent a fresh conversation is created; a given
    /// id that does not belong to `user_id` is
    /// [`RuntimeError::ConversationNotFound`].
    #[instrument(skip_all, fields(user_id, has_conversation = conversation_id.is_some()))]
    pub async fn process_chat(
        &self,
        user_id: &str,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatOutcome> {
        let (conversation, history) = {
            let conn = self.pool.get().map_err(StoreError::from)?;
            let conversation = match conversation_id {
                Some(id) => ConversationRepo::get_by_id(&conn, user_id, id)?
                    .ok_or_else(|| RuntimeError::ConversationNotFound(id.to_owned()))?,
                None => ConversationRepo::create(&conn, user_id, None)?,
            };

            // Only user/assistant turns go back to the model as plain text;
            // persisted tool call records stay out of the transcript.
            let history: Vec<ChatMessage> = ConversationRepo::list_messages(&conn, &conversation.id)?
                .into_iter()
                .filter_map(|m| match m.role {
                    MessageRole::User => Some(ChatMessage::user(m.content)),
                    MessageRole::Assistant => Some(ChatMessage::assistant(m.content)),
                    MessageRole::System => None,
                })
                .collect();

            // The user message is durable before any model call.
            let _ = ConversationRepo::append_message(
                &conn,
                &conversation.id,
                MessageRole::User,
                message,
                None,
            )?;

            (conversation, history)
        };

        let ctx = ToolContext {
            pool: self.pool.clone(),
            user_id: user_id.to_owned(),
        };
        let outcome = self.agent.run(&ctx, &history, message).await;

        let tool_calls_json = if outcome.tool_calls.is_empty() {
            None
        } else {
            match serde_json::to_string(&outcome.tool_calls) {
                Ok(json) => Some(json),
                Err(e) => {
                    warn!(error = %e, "dropping unserializable tool call records");
                    None
                }
            }
        };

        {
            let conn = self.pool.get().map_err(StoreError::from)?;
            let _ = ConversationRepo::append_message(
                &conn,
                &conversation.id,
                MessageRole::Assistant,
                &outcome.reply,
                tool_calls_json.as_deref(),
            )?;
        }

        Ok(ChatOutcome {
            conversation_id: conversation.id,
            reply: outcome.reply,
            tool_calls: outcome.tool_calls,
        })
    }

    /// List a user's conversations, most recently active first.
    pub fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let conn = self.pool.get().map_err(StoreError::from)?;
        Ok(ConversationRepo::list(&conn, user_id)?)
    }

    /// Fetch a conversation with its messages, oldest first.
    pub fn get_conversation(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<(Conversation, Vec<Message>)> {
        let conn = self.pool.get().map_err(StoreError::from)?;
        let conversation = ConversationRepo::get_by_id(&conn, user_id, conversation_id)?
            .ok_or_else(|| RuntimeError::ConversationNotFound(conversation_id.to_owned()))?;
        let messages = ConversationRepo::list_messages(&conn, conversation_id)?;
        Ok((conversation, messages))
    }

    /// Delete a conversation and its messages.
    #[instrument(skip_all, fields(user_id, conversation_id))]
    pub fn delete_conversation(&self, user_id: &str, conversation_id: &str) -> Result<()> {
        let conn = self.pool.get().map_err(StoreError::from)?;
        if ConversationRepo::delete(&conn, user_id, conversation_id)? {
            Ok(())
        } else {
            Err(RuntimeError::ConversationNotFound(
                conversation_id.to_owned(),
            ))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::Value;

    use tally_core::messages::ToolCallRequest;
    use tally_llm::{ChatProvider, ChatRequest, ChatResponse};
    use tally_store::{ConnectionConfig, open_pool};
    use tally_tools::ToolRegistry;

    use crate::agent::AgentConfig;

    struct ScriptedProvider {
        script: Mutex<VecDeque<tally_llm::Result<ChatResponse>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<tally_llm::Result<ChatResponse>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn complete(&self, request: &ChatRequest) -> tally_llm::Result<ChatResponse> {
            self.requests.lock().push(request.clone());
            self.script.lock().pop_front().unwrap_or_else(|| {
                Err(tally_llm::LlmError::InvalidResponse {
                    message: "script exhausted".into(),
                })
            })
        }
    }

    fn service(
        script: Vec<tally_llm::Result<ChatResponse>>,
    ) -> (tempfile::TempDir, Arc<ScriptedProvider>, ChatService) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.db");
        let pool = open_pool(path.to_str().unwrap(), &ConnectionConfig::default()).unwrap();
        let provider = Arc::new(ScriptedProvider::new(script));
        let agent = Agent::new(
            Arc::clone(&provider) as Arc<dyn ChatProvider>,
            Arc::new(ToolRegistry::with_task_tools()),
            AgentConfig::default(),
        );
        (dir, provider, ChatService::new(pool, agent))
    }

    fn text(text: &str) -> ChatResponse {
        ChatResponse {
            content: Some(text.to_owned()),
            tool_calls: Vec::new(),
        }
    }

    fn tool_call(name: &str, arguments: &str) -> ChatResponse {
        ChatResponse {
            content: None,
            tool_calls: vec![ToolCallRequest {
                id: format!("tc-{name}"),
                name: name.to_owned(),
                arguments: arguments.to_owned(),
            }],
        }
    }

    #[tokio::test]
    async fn creates_conversation_and_persists_both_sides() {
        let (_dir, _provider, service) = service(vec![Ok(text("Hello!"))]);
        let outcome = service.process_chat("u1", "hi", None).await.unwrap();

        assert_eq!(outcome.reply, "Hello!");
        assert!(outcome.tool_calls.is_empty());

        let (conversation, messages) = service
            .get_conversation("u1", &outcome.conversation_id)
            .unwrap();
        assert_eq!(conversation.id, outcome.conversation_id);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "Hello!");
        assert!(messages[1].tool_calls.is_none());
    }

    #[tokio::test]
    async fn tool_records_are_stored_on_the_assistant_message() {
        let (_dir, _provider, service) = service(vec![
            Ok(tool_call("add_task", r#"{"title":"Buy milk"}"#)),
            Ok(text("Added it.")),
        ]);
        let outcome = service
            .process_chat("u1", "add buy milk", None)
            .await
            .unwrap();

        assert_eq!(outcome.tool_calls.len(), 1);
        let (_, messages) = service
            .get_conversation("u1", &outcome.conversation_id)
            .unwrap();
        let stored = messages[1].tool_calls.as_deref().unwrap();
        let records: Vec<Value> = serde_json::from_str(stored).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["tool"], "add_task");
        assert_eq!(records[0]["arguments"]["title"], "Buy milk");
        assert_eq!(records[0]["result"]["success"], true);
    }

    #[tokio::test]
    async fn history_is_replayed_to_the_model_in_order() {
        let (_dir, provider, service) = service(vec![
            Ok(text("First reply")),
            Ok(text("Second reply")),
        ]);
        let first = service.process_chat("u1", "first", None).await.unwrap();
        let _ = service
            .process_chat("u1", "second", Some(&first.conversation_id))
            .await
            .unwrap();

        let requests = provider.requests.lock();
        let second_transcript = &requests[1].messages;
        // system + first user + first assistant + second user
        assert_eq!(second_transcript.len(), 4);
        assert_eq!(second_transcript[1], ChatMessage::user("first"));
        assert_eq!(second_transcript[2], ChatMessage::assistant("First reply"));
        assert_eq!(second_transcript[3], ChatMessage::user("second"));
    }

    #[tokio::test]
    async fn unknown_conversation_is_rejected_before_any_model_call() {
        let (_dir, provider, service) = service(vec![Ok(text("never"))]);
        let missing = uuid::Uuid::now_v7().to_string();
        let err = service
            .process_chat("u1", "hi", Some(&missing))
            .await
            .unwrap_err();

        assert!(matches!(err, RuntimeError::ConversationNotFound(id) if id == missing));
        assert!(provider.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn conversation_ownership_is_scoped_per_user() {
        let (_dir, _provider, service) = service(vec![Ok(text("mine")), Ok(text("unused"))]);
        let outcome = service.process_chat("u1", "hi", None).await.unwrap();

        let err = service
            .process_chat("u2", "peek", Some(&outcome.conversation_id))
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::ConversationNotFound(_)));
    }

    #[tokio::test]
    async fn user_message_survives_a_provider_failure() {
        let (_dir, _provider, service) = service(vec![Err(tally_llm::LlmError::Api {
            status: 500,
            message: "upstream down".into(),
        })]);
        let outcome = service.process_chat("u1", "hi", None).await.unwrap();

        assert!(outcome.reply.starts_with("Sorry, I encountered an error:"));
        let (_, messages) = service
            .get_conversation("u1", &outcome.conversation_id)
            .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[1].content, outcome.reply);
    }

    #[tokio::test]
    async fn list_and_delete_conversations() {
        let (_dir, _provider, service) = service(vec![Ok(text("a")), Ok(text("b"))]);
        let first = service.process_chat("u1", "one", None).await.unwrap();
        // Keep updated_at strictly ordered.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = service.process_chat("u1", "two", None).await.unwrap();

        let listed = service.list_conversations("u1").unwrap();
        assert_eq!(listed.len(), 2);
        // Most recently active first.
        assert_eq!(listed[0].id, second.conversation_id);

        service
            .delete_conversation("u1", &first.conversation_id)
            .unwrap();
        assert_eq!(service.list_conversations("u1").unwrap().len(), 1);

        let err = service
            .delete_conversation("u1", &first.conversation_id)
            .unwrap_err();
        assert!(matches!(err, RuntimeError::ConversationNotFound(_)));
    }
}
