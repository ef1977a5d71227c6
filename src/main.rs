use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, RwLock};

use mascot_chat::application::errors::{BotError, TrendError};
use mascot_chat::application::messaging::InputParser;
use mascot_chat::application::services::{ChatEvent, ChatService, CommandService, InputOutcome, ReplyGenerator};
use mascot_chat::domain::traits::{Bot, HistoryStore};
use mascot_chat::infrastructure::adapters::ConsoleAdapter;
use mascot_chat::infrastructure::config::Config;
use mascot_chat::infrastructure::storage::JsonHistoryStore;
use mascot_chat::infrastructure::translate::create_translator;
use mascot_chat::infrastructure::trends::{TrendCollector, TrendData};
use mascot_chat::plugins::{PluginManager, SharedPluginManager};

const COMMAND_PREFIX: &str = "/";

#[derive(Parser)]
#[command(name = "mascot-chat")]
#[command(about = "Console chat with a mascot, plugins and a translated dialogue model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start chatting
    Run,
    /// Collect trend data for prompts
    Trends {
        /// Output file (overrides trends.data-file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List loaded plugins in dispatch order
    Plugins,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Logs go to stderr so they stay out of the conversation
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => load_config(&cli.config).and_then(run_chat),
        Commands::Trends { output } => load_config(&cli.config).and_then(|c| collect_trends(c, output)),
        Commands::Plugins => load_config(&cli.config).and_then(list_plugins),
        Commands::Version => {
            println!("mascot-chat v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(path: &Path) -> Result<Config, BotError> {
    Ok(Config::load_or_default(path)?)
}

fn run_chat(config: Config) -> Result<(), BotError> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(chat_loop(config))
}

async fn chat_loop(config: Config) -> Result<(), BotError> {
    tracing::info!("Starting mascot-chat: {}", config.mascot.name);

    let history: Arc<dyn HistoryStore> = Arc::new(JsonHistoryStore::new(
        &config.history.file,
        config.history.max_entries,
    ));

    let mut manager = PluginManager::new();
    manager.load_from_config(&config)?;
    tracing::info!("Plugin system initialized with {} plugins", manager.len());
    let legend = manager.legend();
    let plugin_infos = manager.list_plugins();
    let plugins: SharedPluginManager = Arc::new(RwLock::new(manager));

    let llm = config.llm.create_provider()?;
    tracing::info!("Using {} ({}) for replies", llm.name(), llm.model());
    let translator = create_translator(&config.translation)?;
    let generator = Arc::new(ReplyGenerator::from_config(&config, translator, llm, Arc::clone(&history)));

    let mut commands = CommandService::new(COMMAND_PREFIX).with_legend(legend);
    commands.register_defaults(
        plugin_infos,
        Arc::clone(&history),
        &config.mascot.user_label,
        &config.mascot.name,
    );
    let parser = InputParser::new(COMMAND_PREFIX, config.mascot.exit_keywords.clone());

    let (tx, mut events) = mpsc::channel(16);
    let chat = ChatService::new(parser, commands, plugins, generator, tx);
    let bot = ConsoleAdapter::new(&config.mascot.name, &config.mascot.user_label);

    let store = Arc::clone(&history);
    match tokio::task::spawn_blocking(move || store.load()).await {
        Ok(Ok(entries)) => bot.replay_history(&entries).await?,
        Ok(Err(e)) => tracing::warn!("Failed to load conversation history: {}", e),
        Err(e) => tracing::warn!("History loader failed: {}", e),
    }

    bot.start().await?;
    bot.prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("End of input");
                    break;
                };

                match chat.handle_input(&line).await {
                    InputOutcome::Ignored => {}
                    InputOutcome::Exit => {
                        bot.send_text("またね！").await?;
                        break;
                    }
                    InputOutcome::Command(output) => bot.send_text(&output).await?,
                    InputOutcome::Plugin { reply, expression } => {
                        bot.show_expression(expression).await?;
                        bot.send_reply(&reply).await?;
                    }
                    InputOutcome::Pending { expression } => {
                        bot.show_expression(expression).await?;
                    }
                }
                bot.prompt()?;
            }
            Some(event) = events.recv() => {
                match event {
                    ChatEvent::NewMessage(entry) => bot.send_exchange(&entry).await?,
                    ChatEvent::Error(message) => bot.send_error(&message).await?,
                }
                bot.prompt()?;
            }
        }
    }

    tracing::info!("Chat ended");
    Ok(())
}

fn collect_trends(config: Config, output: Option<PathBuf>) -> Result<(), BotError> {
    let path = output.unwrap_or_else(|| config.trends.data_file.clone());
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        // The crawler uses a blocking client
        let trends_config = config.trends.clone();
        let mut data = tokio::task::spawn_blocking(move || -> Result<TrendData, TrendError> {
            Ok(TrendCollector::new(&trends_config)?.collect())
        })
        .await
        .map_err(|e| BotError::Internal(e.to_string()))??;

        if config.trends.translate {
            let translator = create_translator(&config.translation)?;
            tracing::info!("Translating trends with {}", translator.name());
            data.translate(
                translator.as_ref(),
                &config.translation.user_language,
                &config.translation.model_language,
            )
            .await;
        }

        data.write(&path)?;
        println!(
            "Saved {} trending words from {} sources to {}",
            data.trending_words.len(),
            data.topics.len(),
            path.display()
        );
        Ok::<(), BotError>(())
    })
}

fn list_plugins(config: Config) -> Result<(), BotError> {
    let mut manager = PluginManager::new();
    manager.load_from_config(&config)?;

    if manager.is_empty() {
        println!("No plugins loaded.");
        return Ok(());
    }

    for (i, plugin) in manager.list_plugins().iter().enumerate() {
        println!("{}. {} - {}", i + 1, plugin.name, plugin.description);
        if let Some(usage) = &plugin.usage {
            println!("   {}", usage);
        }
    }
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).map_err(|e| BotError::Internal(e.to_string()))?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
