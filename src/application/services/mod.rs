//! Application services - chat pipeline orchestration

pub mod chat_service;
pub mod command_service;
pub mod prompt;

pub use chat_service::{ChatEvent, ChatService, InputOutcome, Languages, ReplyGenerator, TrendSettings};
pub use command_service::CommandService;
pub use prompt::PromptBuilder;
