//! Wiring — build the chat runtime from settings.

use std::sync::Arc;

use tally_llm::{OpenAiConfig, OpenAiProvider};
use tally_settings::Settings;
use tally_store::{ConnectionConfig, open_pool};
use tally_tools::ToolRegistry;

use crate::agent::{Agent, AgentConfig};
use crate::chat::ChatService;
use crate::errors::Result;

/// Build a [`ChatService`] from settings: open (and migrate) the database,
/// construct the provider, and register the task tools.
pub fn build_chat_service(settings: &Settings) -> Result<ChatService> {
    let pool = open_pool(&settings.database.path, &ConnectionConfig::default())?;

    let provider = Arc::new(OpenAiProvider::new(OpenAiConfig {
        base_url: settings.llm.base_url.clone(),
        api_key: settings.llm.api_key.clone(),
    }));

    let agent = Agent::new(
        provider,
        Arc::new(ToolRegistry::with_task_tools()),
        AgentConfig {
            model: settings.llm.model.clone(),
            max_rounds: settings.agent.max_rounds,
        },
    );

    Ok(ChatService::new(pool, agent))
}
