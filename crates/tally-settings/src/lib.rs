//! # tally-settings
//!
//! Layered configuration for the Tally task assistant.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`Settings::default()`]
//! 2. **JSON file** — deep-merged over defaults
//! 3. **Environment variables** — `TALLY_*` overrides (highest priority)
//!
//! There is no process-wide singleton: [`load_settings`] returns an owned
//! [`Settings`] value that callers pass explicitly into the runtime at
//! construction time.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path};
pub use types::{AgentSettings, DatabaseSettings, LlmSettings, Settings};
