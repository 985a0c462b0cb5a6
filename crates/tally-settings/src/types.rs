//! Settings type definitions.
//!
//! All field names are camelCase on the wire. Each type implements
//! [`Default`] with production default values, and `#[serde(default)]`
//! allows partial JSON — missing fields get their default during
//! deserialization.

use serde::{Deserialize, Serialize};

/// Root settings type for the Tally service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings schema version.
    pub version: String,
    /// SQLite database settings.
    pub database: DatabaseSettings,
    /// Language-model client settings.
    pub llm: LlmSettings,
    /// Agent loop settings.
    pub agent: AgentSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            database: DatabaseSettings::default(),
            llm: LlmSettings::default(),
            agent: AgentSettings::default(),
        }
    }
}

/// SQLite database settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Filesystem path of the database file.
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "tally.db".to_string(),
        }
    }
}

/// Language-model client settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmSettings {
    /// API base URL (chat-completions compatible).
    pub base_url: String,
    /// Bearer token. Empty by default; normally supplied via
    /// `TALLY_LLM_API_KEY`.
    pub api_key: String,
    /// Model ID.
    pub model: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Agent loop settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSettings {
    /// Maximum model rounds per user turn.
    pub max_rounds: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self { max_rounds: 3 }
    }
}
