//! Settings loading: defaults → JSON file deep-merge → env overrides.

use std::path::Path;

use serde_json::Value;

use crate::errors::{Result, SettingsError};
use crate::types::Settings;

/// Deep-merge `overlay` into `base`.
///
/// Objects merge recursively; any other value in `overlay` replaces the
/// corresponding `base` value outright.
#[must_use]
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                let _ = base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Load settings from compiled defaults plus `TALLY_*` env overrides only.
pub fn load_settings() -> Result<Settings> {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Load settings from a JSON file, deep-merged over defaults, with
/// `TALLY_*` env overrides applied last.
pub fn load_settings_from_path(path: &Path) -> Result<Settings> {
    let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_value: Value = serde_json::from_str(&raw)?;
    let defaults = serde_json::to_value(Settings::default())?;
    let merged = deep_merge(defaults, file_value);
    let mut settings: Settings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Apply `TALLY_*` environment variable overrides (highest priority).
fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(path) = std::env::var("TALLY_DB_PATH") {
        settings.database.path = path;
    }
    if let Ok(base_url) = std::env::var("TALLY_LLM_BASE_URL") {
        settings.llm.base_url = base_url;
    }
    if let Ok(api_key) = std::env::var("TALLY_LLM_API_KEY") {
        settings.llm.api_key = api_key;
    }
    if let Ok(model) = std::env::var("TALLY_LLM_MODEL") {
        settings.llm.model = model;
    }
    if let Ok(max_rounds) = std::env::var("TALLY_AGENT_MAX_ROUNDS") {
        match max_rounds.parse::<u32>() {
            Ok(parsed) if parsed > 0 => settings.agent.max_rounds = parsed,
            _ => tracing::warn!(
                value = %max_rounds,
                "ignoring invalid TALLY_AGENT_MAX_ROUNDS"
            ),
        }
    }
}
