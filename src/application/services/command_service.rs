use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandRegistry};
use crate::domain::traits::HistoryStore;
use crate::plugins::PluginInfo;

const DEFAULT_HISTORY_COUNT: usize = 10;

/// Service for managing and executing slash commands
pub struct CommandService {
    registry: CommandRegistry,
    prefix: String,
    legend: String,
}

impl CommandService {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            prefix: prefix.into(),
            legend: String::new(),
        }
    }

    /// Plugin legend appended to `/help`
    pub fn with_legend(mut self, legend: impl Into<String>) -> Self {
        self.legend = legend.into();
        self
    }

    pub fn register(&mut self, command: Command) {
        self.registry.register(command);
    }

    pub fn register_defaults(
        &mut self,
        plugins: Vec<PluginInfo>,
        history: Arc<dyn HistoryStore>,
        user_label: impl Into<String>,
        mascot_name: impl Into<String>,
    ) {
        // Help has no handler; execute() renders it from the registry
        self.register(Command::new("help")
            .with_description("Show commands and the plugin legend")
            .with_aliases(vec!["h".to_string(), "?".to_string()])
            .with_usage("/help [command]"));

        self.register(Command::new("plugins")
            .with_description("List loaded plugins in dispatch order")
            .with_handler(move |_| Ok(format_plugins(&plugins))));

        let user_label = user_label.into();
        let mascot_name = mascot_name.into();
        self.register(Command::new("history")
            .with_description("Show recent conversation")
            .with_usage("/history [n]")
            .with_handler(move |args| {
                let count = match args.first() {
                    Some(n) => n
                        .parse::<usize>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| CommandError::InvalidArgs(format!("'{}' is not a positive number", n)))?,
                    None => DEFAULT_HISTORY_COUNT,
                };
                let entries = history
                    .recent(count)
                    .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;
                if entries.is_empty() {
                    return Ok("No conversation history yet.".to_string());
                }
                Ok(entries
                    .iter()
                    .map(|e| e.render(&user_label, &mascot_name))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }));

        self.register(Command::new("version")
            .with_description("Show version")
            .with_handler(|_| {
                Ok(format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")))
            }));
    }

    /// Run a command by name or alias
    pub fn execute(&self, name: &str, args: &[String]) -> Result<String, CommandError> {
        let cmd = self.registry.find(name)
            .ok_or_else(|| CommandError::NotFound(name.to_string()))?;

        match &cmd.handler {
            Some(handler) => handler(args),
            None => Ok(self.get_help(args.first().map(|s| s.as_str()))),
        }
    }

    pub fn get_help(&self, command: Option<&str>) -> String {
        if let Some(name) = command {
            let name = name.trim_start_matches(self.prefix.as_str());
            if let Some(cmd) = self.registry.find(name) {
                let mut help = format!("{}{} - {}", self.prefix, cmd.name, cmd.description.as_deref().unwrap_or("No description"));
                if let Some(usage) = &cmd.usage {
                    help.push_str(&format!("\nUsage: {}", usage));
                }
                return help;
            }
            return format!("Command {}{} not found", self.prefix, name);
        }

        let mut help = "Available commands:\n".to_string();
        for cmd in self.registry.all() {
            help.push_str(&format!("  {}{} - {}\n", self.prefix, cmd.name, cmd.description.as_deref().unwrap_or("")));
        }
        if !self.legend.is_empty() {
            help.push('\n');
            help.push_str(&self.legend);
        }
        help
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

fn format_plugins(plugins: &[PluginInfo]) -> String {
    if plugins.is_empty() {
        return "No plugins loaded.".to_string();
    }
    let mut text = format!("Plugins ({}):\n", plugins.len());
    for (i, plugin) in plugins.iter().enumerate() {
        text.push_str(&format!("  {}. {} - {}\n", i + 1, plugin.name, plugin.description));
    }
    text
}
