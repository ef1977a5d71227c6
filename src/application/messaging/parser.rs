//! Input parser - classifies raw console lines

use crate::domain::entities::Content;

/// What a line of input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    /// Blank line
    Empty,
    /// Contains an exit keyword
    Exit,
    /// Anything else, as a message
    Message(Content),
}

/// Parses console input into structured messages
pub struct InputParser {
    command_prefix: String,
    exit_keywords: Vec<String>,
}

impl InputParser {
    pub fn new(prefix: impl Into<String>, exit_keywords: Vec<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
            exit_keywords,
        }
    }

    /// Exit keywords match anywhere in the input, ignoring ASCII case
    pub fn is_exit(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.exit_keywords
            .iter()
            .filter(|k| !k.is_empty())
            .any(|k| lowered.contains(&k.to_lowercase()))
    }

    pub fn parse(&self, raw: &str) -> ParsedInput {
        let text = raw.trim();

        if text.is_empty() {
            return ParsedInput::Empty;
        }
        if self.is_exit(text) {
            return ParsedInput::Exit;
        }
        if let Some(cmd_text) = text.strip_prefix(&self.command_prefix) {
            return ParsedInput::Message(Self::parse_command(cmd_text));
        }

        ParsedInput::Message(Content::Text(text.to_string()))
    }

    fn parse_command(cmd_text: &str) -> Content {
        let mut parts = cmd_text.split_whitespace().map(|s| s.to_string());
        let name = parts.next().unwrap_or_default();
        Content::Command {
            name,
            args: parts.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> InputParser {
        InputParser::new(
            "/",
            vec!["exit".to_string(), "bye".to_string(), "ばいばい".to_string()],
        )
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parser().parse("   "), ParsedInput::Empty);
        assert_eq!(parser().parse(""), ParsedInput::Empty);
    }

    #[test]
    fn test_exit_keyword_anywhere() {
        let p = parser();
        assert_eq!(p.parse("Bye!"), ParsedInput::Exit);
        assert_eq!(p.parse("じゃあね、ばいばい"), ParsedInput::Exit);
        // substring match also catches longer words
        assert_eq!(p.parse("goodbye everyone"), ParsedInput::Exit);
        assert_eq!(p.parse("こんにちは"), ParsedInput::Message(Content::Text("こんにちは".to_string())));
    }

    #[test]
    fn test_command_parsing() {
        let parsed = parser().parse(" /history 5 ");
        assert_eq!(
            parsed,
            ParsedInput::Message(Content::Command {
                name: "history".to_string(),
                args: vec!["5".to_string()],
            })
        );
        assert_eq!(
            parser().parse("/"),
            ParsedInput::Message(Content::Command { name: String::new(), args: vec![] })
        );
    }

    #[test]
    fn test_text_is_trimmed() {
        assert_eq!(
            parser().parse("  時刻 東京  "),
            ParsedInput::Message(Content::Text("時刻 東京".to_string()))
        );
    }
}
