//! Chat pipeline
//!
//! Each line is either ignored, ends the session, runs a slash command, is
//! answered by a plugin, or is handed to a background task that translates
//! it, asks the dialogue model and translates the answer back.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use super::command_service::CommandService;
use super::prompt::PromptBuilder;
use crate::application::errors::BotError;
use crate::application::messaging::{InputParser, ParsedInput};
use crate::domain::entities::{ChatReply, Content, Expression, HistoryEntry};
use crate::domain::traits::HistoryStore;
use crate::infrastructure::config::Config;
use crate::infrastructure::llm::{LLMError, Sampling, LLM};
use crate::infrastructure::translate::Translator;
use crate::infrastructure::trends::load_fresh;
use crate::plugins::SharedPluginManager;

/// Results of background generation, delivered to the front-end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A finished exchange with the dialogue model
    NewMessage(HistoryEntry),
    Error(String),
}

/// What the front-end should do with a line of input
#[derive(Debug, Clone)]
pub enum InputOutcome {
    Ignored,
    Exit,
    /// Output of a slash command
    Command(String),
    /// A plugin answered immediately
    Plugin { reply: ChatReply, expression: Expression },
    /// The model is working; a `ChatEvent` will follow
    Pending { expression: Expression },
}

/// Language pair for the translate round trip
#[derive(Debug, Clone)]
pub struct Languages {
    pub user: String,
    pub model: String,
}

/// Where prompt topics come from
#[derive(Debug, Clone)]
pub struct TrendSettings {
    pub data_file: PathBuf,
    pub max_age_days: i64,
}

/// Runs one translate -> generate -> translate round trip at a time
pub struct ReplyGenerator {
    translator: Arc<dyn Translator>,
    llm: Arc<dyn LLM>,
    history: Arc<dyn HistoryStore>,
    prompt: PromptBuilder,
    languages: Languages,
    trends: TrendSettings,
    sampling: Sampling,
    gate: Mutex<()>,
}

impl ReplyGenerator {
    pub fn new(
        translator: Arc<dyn Translator>,
        llm: Arc<dyn LLM>,
        history: Arc<dyn HistoryStore>,
        prompt: PromptBuilder,
        languages: Languages,
        trends: TrendSettings,
    ) -> Self {
        Self {
            translator,
            llm,
            history,
            prompt,
            languages,
            trends,
            sampling: Sampling::new(0.7, None),
            gate: Mutex::new(()),
        }
    }

    pub fn from_config(
        config: &Config,
        translator: Arc<dyn Translator>,
        llm: Arc<dyn LLM>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        let prompt = PromptBuilder::new(&config.mascot.persona, config.trends.topic_count);
        let languages = Languages {
            user: config.translation.user_language.clone(),
            model: config.translation.model_language.clone(),
        };
        let trends = TrendSettings {
            data_file: config.trends.data_file.clone(),
            max_age_days: config.trends.max_age_days,
        };
        Self::new(translator, llm, history, prompt, languages, trends)
            .with_sampling(config.llm.temperature, config.llm.max_tokens)
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: Option<u32>) -> Self {
        self.sampling = Sampling::new(temperature, max_tokens);
        self
    }

    async fn load_trends(&self) -> Option<crate::infrastructure::trends::TrendData> {
        let path = self.trends.data_file.clone();
        let max_age = self.trends.max_age_days;
        tokio::task::spawn_blocking(move || load_fresh(path, max_age))
            .await
            .ok()
            .flatten()
    }

    /// Answer `input` and record the exchange
    pub async fn generate(&self, input: &str) -> Result<HistoryEntry, BotError> {
        let _turn = self.gate.lock().await;
        let langs = &self.languages;

        let input_model = self.translator.translate(input, &langs.user, &langs.model).await?;
        tracing::debug!("Translated input: {}", input_model);

        let trends = self.load_trends().await;
        let messages = {
            let mut rng = StdRng::from_os_rng();
            self.prompt.build(&input_model, trends.as_ref(), &mut rng)
        };

        let response = self.llm.chat(&messages, self.sampling).await?;
        let reply_model = response.content.trim();
        if reply_model.is_empty() {
            return Err(LLMError::EmptyReply(self.llm.name().to_string()).into());
        }

        let reply = self.translator.translate(reply_model, &langs.model, &langs.user).await?;
        let entry = HistoryEntry::new(input, reply);

        // A reply that could not be saved is still shown
        let store = Arc::clone(&self.history);
        let record = entry.clone();
        match tokio::task::spawn_blocking(move || store.append(record)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to save conversation history: {}", e),
            Err(e) => tracing::warn!("History writer failed: {}", e),
        }

        Ok(entry)
    }
}

/// Entry point for every line the user types
pub struct ChatService {
    parser: InputParser,
    commands: CommandService,
    plugins: SharedPluginManager,
    generator: Arc<ReplyGenerator>,
    events: mpsc::Sender<ChatEvent>,
}

impl ChatService {
    pub fn new(
        parser: InputParser,
        commands: CommandService,
        plugins: SharedPluginManager,
        generator: Arc<ReplyGenerator>,
        events: mpsc::Sender<ChatEvent>,
    ) -> Self {
        Self {
            parser,
            commands,
            plugins,
            generator,
            events,
        }
    }

    pub async fn handle_input(&self, raw: &str) -> InputOutcome {
        let text = match self.parser.parse(raw) {
            ParsedInput::Empty => return InputOutcome::Ignored,
            ParsedInput::Exit => return InputOutcome::Exit,
            ParsedInput::Message(Content::Command { name, args }) => {
                tracing::debug!("Command: {} {:?}", name, args);
                let output = match self.commands.execute(&name, &args) {
                    Ok(output) => output,
                    Err(e) => format!("⚠️ {} (type {}help)", e, self.commands.prefix()),
                };
                return InputOutcome::Command(output);
            }
            ParsedInput::Message(Content::Text(text)) => text,
        };

        let expression = Expression::from_input(&text);

        let handled = self.plugins.read().await.dispatch(&text).await;
        if let Some(reply) = handled {
            tracing::info!("Plugin '{}' answered", reply.plugin);
            return InputOutcome::Plugin {
                reply: ChatReply::from_plugin(reply.plugin, reply.text),
                expression,
            };
        }

        let generator = Arc::clone(&self.generator);
        let events = self.events.clone();
        tokio::spawn(async move {
            let event = match generator.generate(&text).await {
                Ok(entry) => ChatEvent::NewMessage(entry),
                Err(e) => {
                    tracing::error!("Reply generation failed: {}", e);
                    ChatEvent::Error(e.to_string())
                }
            };
            if events.send(event).await.is_err() {
                tracing::debug!("Event receiver closed");
            }
        });

        InputOutcome::Pending { expression }
    }
}
