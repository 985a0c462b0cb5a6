//! # tally-runtime
//!
//! Agent execution loop and chat orchestration.
//!
//! - **Agent**: bounded tool-calling loop over a [`tally_llm::ChatProvider`]
//! - **Chat service**: resolves conversations, persists both sides of each
//!   exchange, and runs the agent in between
//! - **Factory**: wires provider, registry, and pool from settings

#![deny(unsafe_code)]

pub mod agent;
pub mod chat;
pub mod errors;
pub mod factory;

pub use agent::{Agent, AgentConfig, AgentOutcome, SYSTEM_PROMPT};
pub use chat::{ChatOutcome, ChatService};
pub use errors::{Result, RuntimeError};
pub use factory::build_chat_service;
