//! # tally-llm
//!
//! Chat provider abstraction for the Tally agent loop.
//!
//! [`provider::ChatProvider`] is the seam the runtime talks through; the one
//! shipped backend is [`openai::OpenAiProvider`], which speaks the
//! OpenAI-compatible chat completions API (non-streaming, tool calling).

#![deny(unsafe_code)]

pub mod errors;
pub mod openai;
pub mod provider;

pub use errors::{LlmError, Result};
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::{ChatProvider, ChatRequest, ChatResponse};
