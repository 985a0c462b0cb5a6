//! # tally-tools
//!
//! Task management tools exposed to the assistant.
//!
//! Every tool implements [`traits::AssistantTool`] and returns the uniform
//! `{success, message, data}` envelope — failures are data fed back to the
//! model, never errors. The [`registry::ToolRegistry`] maps tool names to
//! implementations and generates the schema list sent to the LLM.

#![deny(unsafe_code)]

pub mod registry;
pub mod tasks;
pub mod traits;

pub use registry::{DuplicateTool, ToolRegistry, dispatch};
pub use traits::{AssistantTool, ToolContext};
