use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Timestamp format used in the conversation log
pub const HISTORY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One exchange with the dialogue model, as stored in the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub time: String,
    pub input: String,
    pub response: String,
}

impl HistoryEntry {
    pub fn new(input: impl Into<String>, response: impl Into<String>) -> Self {
        Self::at(Local::now(), input, response)
    }

    pub fn at(time: DateTime<Local>, input: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            time: time.format(HISTORY_TIME_FORMAT).to_string(),
            input: input.into(),
            response: response.into(),
        }
    }

    /// Render the exchange the way it is replayed on startup
    pub fn render(&self, user_label: &str, mascot_name: &str) -> String {
        format!(
            "[{time}] {user}\n👹: {input}\n[{time}] {mascot}\n🐰: {response}",
            time = self.time,
            user = user_label,
            input = self.input,
            mascot = mascot_name,
            response = self.response,
        )
    }
}
