//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Messages, replies, history entries, commands, expressions
//! - Traits: Abstractions for infrastructure (Bot, HistoryStore)

pub mod entities;
pub mod traits;
