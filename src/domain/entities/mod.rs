//! Domain entities - Core business objects with no external dependencies

pub mod message;
pub mod command;
pub mod history;
pub mod expression;

pub use message::{Content, ChatReply, ReplySource};
pub use command::{Command, CommandRegistry};
pub use history::HistoryEntry;
pub use expression::Expression;
