use async_trait::async_trait;
use crate::application::errors::BotError;
use crate::domain::entities::{ChatReply, Expression, HistoryEntry};

/// Front-end abstraction: where replies and reactions are shown
#[async_trait]
pub trait Bot: Send + Sync {
    /// Prepare the front-end before the first message
    async fn start(&self) -> Result<(), BotError>;

    /// Show a reply
    async fn send_reply(&self, reply: &ChatReply) -> Result<(), BotError>;

    /// Show plain text (command output, notices)
    async fn send_text(&self, text: &str) -> Result<(), BotError>;

    /// Show an error
    async fn send_error(&self, message: &str) -> Result<(), BotError>;

    /// React to input with a mascot expression
    async fn show_expression(&self, expression: Expression) -> Result<(), BotError>;

    /// Show a finished exchange with the dialogue model, user line first
    async fn send_exchange(&self, entry: &HistoryEntry) -> Result<(), BotError>;

    /// Replay stored history
    async fn replay_history(&self, entries: &[HistoryEntry]) -> Result<(), BotError>;
}
