//! # tally-store
//!
//! `SQLite` persistence layer for the Tally task assistant.
//!
//! - **Connection pool**: `r2d2` + `rusqlite` with WAL mode and foreign keys
//! - **Migrations**: version-tracked SQL schema evolution
//! - **Repositories**: stateless structs whose methods take `&Connection`
//!   (task, tag, conversation)
//! - **Task service**: validation and recurrence-aware completion on top of
//!   the repositories

#![deny(unsafe_code)]

pub mod errors;
pub mod migrations;
pub mod pool;
pub mod repositories;
pub mod service;
pub mod types;

pub use errors::{Result, StoreError};
pub use pool::{ConnectionConfig, ConnectionPool, PooledConnection, open_pool};
pub use repositories::conversation::ConversationRepo;
pub use repositories::tag::TagRepo;
pub use repositories::task::TaskRepo;
pub use service::{CompletionOutcome, TaskService};
pub use types::{
    Conversation, Message, Tag, Task, TaskCreateParams, TaskFilter, TaskListResult,
    TaskUpdateParams,
};
