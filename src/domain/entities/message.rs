use chrono::{DateTime, Local};

/// Parsed user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command { name: String, args: Vec<String> },
}

/// Where a reply came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    /// A plugin answered; carries the plugin name
    Plugin(String),
    /// The dialogue model answered
    Model,
}

/// A reply shown to the user
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    pub source: ReplySource,
    pub timestamp: DateTime<Local>,
}

impl ChatReply {
    pub fn from_plugin(plugin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: ReplySource::Plugin(plugin.into()),
            timestamp: Local::now(),
        }
    }

    pub fn from_model(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: ReplySource::Model,
            timestamp: Local::now(),
        }
    }

    pub fn is_plugin(&self) -> bool {
        matches!(self.source, ReplySource::Plugin(_))
    }

    /// Render for display, e.g. `[12:30] mascot(プラグイン): ...`
    pub fn render(&self, mascot_name: &str) -> String {
        let time = self.timestamp.format("%H:%M");
        match &self.source {
            ReplySource::Plugin(_) => format!("[{}] {}(プラグイン): {}", time, mascot_name, self.text),
            ReplySource::Model => format!("[{}] {}\n🐰: {}", time, mascot_name, self.text),
        }
    }
}
