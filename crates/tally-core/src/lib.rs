//! # tally-core
//!
//! Foundation types for the Tally task assistant.
//!
//! This crate provides the shared vocabulary that all other Tally crates
//! depend on:
//!
//! - **Enums**: [`enums::Priority`], [`enums::Recurrence`], [`enums::MessageRole`]
//! - **Messages**: [`messages::ChatMessage`] tagged union with `System`, `User`,
//!   `Assistant`, and `Tool` variants
//! - **Tool types**: [`tools::ToolDefinition`] catalog entries and the uniform
//!   [`tools::ToolResponse`] envelope
//! - **Recurrence**: [`recurrence::next_due_date`] and
//!   [`recurrence::next_reminder_time`] pure date arithmetic
//! - **Logging**: [`logging::init_logging`] one-shot tracing setup
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other tally crates.

#![deny(unsafe_code)]

pub mod enums;
pub mod logging;
pub mod messages;
pub mod recurrence;
pub mod tools;
