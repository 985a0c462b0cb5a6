//! Bounded tool-calling agent loop.
//!
//! One [`Agent::run`] call handles one user turn: it submits the transcript
//! and tool catalog to the provider, executes whatever tool calls come back,
//! feeds the results into the transcript, and repeats until the model answers
//! in plain text or the round cap is hit. The loop never fails — provider
//! errors become reply text and every executed tool is recorded either way.

use std::sync::Arc;

use metrics::counter;
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument};

use tally_core::messages::{ChatMessage, ToolInvocation};
use tally_llm::{ChatProvider, ChatRequest};
use tally_tools::{ToolContext, ToolRegistry, dispatch};

/// System instruction fixed at the head of every transcript.
pub const SYSTEM_PROMPT: &str = "\
You are a helpful Todo assistant. You help users manage their tasks through natural language.

You can:
- Add new tasks (use add_task)
- List tasks (use list_tasks)
- Mark tasks complete (use complete_task)
- Update tasks (use update_task)
- Delete tasks (use delete_task) - ALWAYS ask for confirmation before deleting

Rules:
1. ALWAYS reply to EVERY user message. Never stay silent. Even if you don't understand, ask for clarification.
2. Be concise and friendly
3. When user refers to a task by NUMBER (like \"task 1\", \"task 2\"), you MUST:
   - First call list_tasks to get all tasks
   - Find the task with matching \"number\" field (1, 2, 3...)
   - Use that task's \"task_id\" (UUID) for update/delete/complete operations
4. When user mentions a task by name/title, use list_tasks with search parameter to find it
5. ALWAYS confirm before deleting a task
6. If multiple tasks match, ask user to clarify which one
7. After completing an action, summarize what was done
8. IMPORTANT: Reply in the SAME language the user writes in. If user writes in English, reply in English. If user writes in Roman Urdu (like \"mera task add karo\"), reply in Roman Urdu.
9. If user says hi, hello, or greets you, respond with a friendly greeting and offer to help with tasks.

**MANDATORY: When listing tasks, COPY the formatted text from the tool response message EXACTLY as shown. Do NOT reformat it. The message already contains properly formatted tasks with numbers, icons, descriptions, and priorities. Just display it as-is.**
";

/// Agent loop configuration.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Model ID passed through to the provider.
    pub model: String,
    /// Maximum provider rounds per user turn.
    pub max_rounds: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_owned(),
            max_rounds: 3,
        }
    }
}

/// Result of one agent turn: the reply plus every tool invocation made.
#[derive(Debug)]
pub struct AgentOutcome {
    /// Final assistant reply text.
    pub reply: String,
    /// Tool invocations executed during the turn, in order.
    pub tool_calls: Vec<ToolInvocation>,
}

/// The tool-calling agent.
pub struct Agent {
    provider: Arc<dyn ChatProvider>,
    registry: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create an agent over a provider and tool registry.
    #[must_use]
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        registry: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            config,
        }
    }

    /// Run one user turn.
    ///
    /// `history` holds the prior user/assistant turns, oldest first; the
    /// system prompt and the new user message are added here.
    #[instrument(skip_all, fields(user_id = %ctx.user_id, model = %self.config.model))]
    pub async fn run(
        &self,
        ctx: &ToolContext,
        history: &[ChatMessage],
        user_message: &str,
    ) -> AgentOutcome {
        let mut invocations: Vec<ToolInvocation> = Vec::new();

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(SYSTEM_PROMPT));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(user_message));

        let tools = self.registry.definitions();

        for round in 1..=self.config.max_rounds {
            debug!(round, transcript_len = messages.len(), "agent round");
            counter!("tally_agent_rounds_total").increment(1);

            let request = ChatRequest {
                model: self.config.model.clone(),
                messages: messages.clone(),
                tools: tools.clone(),
            };

            let response = match self.provider.complete(&request).await {
                Ok(response) => response,
                Err(e) => {
                    error!(round, error = %e, "provider call failed");
                    counter!("tally_agent_errors_total").increment(1);
                    // Executed tool effects are not rolled back, so a failure
                    // after the first tool call still reads as success.
                    let reply = if invocations.is_empty() {
                        format!("Sorry, I encountered an error: {e}")
                    } else {
                        "Task completed successfully!".to_owned()
                    };
                    return AgentOutcome {
                        reply,
                        tool_calls: invocations,
                    };
                }
            };

            if !response.has_tool_calls() {
                let reply = response
                    .text()
                    .map_or_else(|| "Done! Task completed successfully.".to_owned(), str::to_owned);
                return AgentOutcome {
                    reply,
                    tool_calls: invocations,
                };
            }

            messages.push(ChatMessage::Assistant {
                content: response.content.clone(),
                tool_calls: response.tool_calls.clone(),
            });

            for call in &response.tool_calls {
                // An unparsable argument string degrades to no arguments; the
                // tool reports the missing fields in its envelope.
                let arguments: Map<String, Value> =
                    serde_json::from_str(&call.arguments).unwrap_or_default();

                info!(tool = %call.name, "executing tool call");
                let result = dispatch(&self.registry, &call.name, &arguments, ctx).await;

                let content = serde_json::to_string(&result).unwrap_or_else(|_| {
                    r#"{"success":false,"message":"result serialization failed"}"#.to_owned()
                });
                messages.push(ChatMessage::Tool {
                    tool_call_id: call.id.clone(),
                    content,
                });

                invocations.push(ToolInvocation {
                    tool: call.name.clone(),
                    arguments: Value::Object(arguments),
                    result,
                });
            }
        }

        info!(max_rounds = self.config.max_rounds, "round cap reached");
        AgentOutcome {
            reply: "Task completed.".to_owned(),
            tool_calls: invocations,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
