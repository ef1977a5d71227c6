//! Console front-end

use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

use crate::application::errors::BotError;
use crate::domain::entities::{ChatReply, Expression, HistoryEntry};
use crate::domain::traits::Bot;

type Output = Box<dyn Write + Send>;

/// Prints the conversation to a terminal
pub struct ConsoleAdapter {
    name: String,
    user_label: String,
    out: Mutex<Output>,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>, user_label: impl Into<String>) -> Self {
        Self::with_writer(name, user_label, Box::new(std::io::stdout()))
    }

    pub fn with_writer(name: impl Into<String>, user_label: impl Into<String>, out: Output) -> Self {
        Self {
            name: name.into(),
            user_label: user_label.into(),
            out: Mutex::new(out),
        }
    }

    fn write_line(&self, text: &str) -> Result<(), BotError> {
        let mut out = self.out.lock().map_err(|e| BotError::Internal(e.to_string()))?;
        writeln!(out, "{}", text)?;
        out.flush()?;
        Ok(())
    }

    /// Input prompt, without a newline
    pub fn prompt(&self) -> Result<(), BotError> {
        let mut out = self.out.lock().map_err(|e| BotError::Internal(e.to_string()))?;
        write!(out, "{}> ", self.user_label)?;
        out.flush()?;
        Ok(())
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console chat");
        self.write_line(&format!(
            "🐰 {} とおしゃべりしよう！ (/help でコマンド一覧、bye で終了)",
            self.name
        ))
    }

    async fn send_reply(&self, reply: &ChatReply) -> Result<(), BotError> {
        self.write_line(&reply.render(&self.name))
    }

    async fn send_text(&self, text: &str) -> Result<(), BotError> {
        self.write_line(text)
    }

    async fn send_error(&self, message: &str) -> Result<(), BotError> {
        self.write_line(&format!("⚠️ エラー: {}", message))
    }

    async fn show_expression(&self, expression: Expression) -> Result<(), BotError> {
        if expression == Expression::Normal {
            return Ok(());
        }
        self.write_line(&format!("{} {}", self.name, expression.face()))
    }

    async fn send_exchange(&self, entry: &HistoryEntry) -> Result<(), BotError> {
        let reply = ChatReply::from_model(entry.response.as_str());
        let time = reply.timestamp.format("%H:%M");
        self.write_line(&format!("[{}] {}\n👹: {}", time, self.user_label, entry.input))?;
        self.write_line(&reply.render(&self.name))
    }

    async fn replay_history(&self, entries: &[HistoryEntry]) -> Result<(), BotError> {
        for entry in entries {
            self.write_line(&entry.render(&self.user_label, &self.name))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Writer that keeps everything written to it
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn console() -> (ConsoleAdapter, Captured) {
        let captured = Captured::default();
        let adapter = ConsoleAdapter::with_writer("mascot", "あなた", Box::new(captured.clone()));
        (adapter, captured)
    }

    #[tokio::test]
    async fn test_replay_history() {
        let (adapter, captured) = console();
        let entry = HistoryEntry {
            time: "2024-03-01 12:00".to_string(),
            input: "やあ".to_string(),
            response: "こんにちは".to_string(),
        };
        adapter.replay_history(&[entry]).await.unwrap();
        assert_eq!(
            captured.text(),
            "[2024-03-01 12:00] あなた\n👹: やあ\n[2024-03-01 12:00] mascot\n🐰: こんにちは\n"
        );
    }

    #[tokio::test]
    async fn test_new_exchange_shows_user_line() {
        let (adapter, captured) = console();
        let entry = HistoryEntry {
            time: "2024-03-01 12:05".to_string(),
            input: "元気？".to_string(),
            response: "元気だよ".to_string(),
        };
        adapter.send_exchange(&entry).await.unwrap();

        let text = captured.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with('[') && lines[0].ends_with("] あなた"));
        assert_eq!(lines[1], "👹: 元気？");
        assert!(lines[2].ends_with("] mascot"));
        assert_eq!(lines[3], "🐰: 元気だよ");
        // live lines carry only the clock time
        assert_eq!(lines[0].len(), "[12:05] あなた".len());
    }

    #[tokio::test]
    async fn test_plugin_reply_and_expression() {
        let (adapter, captured) = console();
        adapter.send_reply(&ChatReply::from_plugin("clock", "12:00")).await.unwrap();
        adapter.show_expression(Expression::Normal).await.unwrap();
        adapter.show_expression(Expression::Angry).await.unwrap();

        let text = captured.text();
        assert!(text.contains("mascot(プラグイン): 12:00\n"));
        assert!(text.ends_with("mascot (`皿´)\n"));
    }

    #[tokio::test]
    async fn test_error_and_prompt() {
        let (adapter, captured) = console();
        adapter.send_error("offline").await.unwrap();
        adapter.prompt().unwrap();
        assert_eq!(captured.text(), "⚠️ エラー: offline\nあなた> ");
    }
}
