//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: the chat pipeline, slash commands and prompt assembly
//! - Errors: Domain-specific errors
//! - Messaging: Input parsing

pub mod errors;
pub mod services;
pub mod messaging;
