//! Stateless repositories over the task database.
//!
//! Every method takes `&Connection`, so callers control transactions and
//! connection lifetime.

pub mod conversation;
pub mod tag;
pub mod task;
