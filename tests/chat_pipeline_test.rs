//! End-to-end chat pipeline tests with a scripted dialogue model
//! Run with: cargo test --test chat_pipeline_test

use async_trait::async_trait;
use chrono::Local;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, RwLock};

use mascot_chat::application::messaging::InputParser;
use mascot_chat::application::services::{ChatEvent, ChatService, CommandService, InputOutcome, ReplyGenerator};
use mascot_chat::domain::traits::HistoryStore;
use mascot_chat::infrastructure::config::Config;
use mascot_chat::infrastructure::llm::{LLMMessage, LLMResponse, LLMResult, Sampling, LLM};
use mascot_chat::infrastructure::storage::JsonHistoryStore;
use mascot_chat::infrastructure::translate::PassthroughTranslator;
use mascot_chat::infrastructure::trends::TrendData;
use mascot_chat::plugins::{BuiltinPlugin, PluginManager};

/// Replies with a fixed line and keeps the prompts it was given
#[derive(Default)]
struct ScriptedLLM {
    prompts: Mutex<Vec<Vec<LLMMessage>>>,
}

#[async_trait]
impl LLM for ScriptedLLM {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    async fn chat(&self, messages: &[LLMMessage], _sampling: Sampling) -> LLMResult<LLMResponse> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        Ok(LLMResponse {
            content: "  うさぎだよ  ".to_string(),
            model: self.model().to_string(),
        })
    }
}

fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.history.file = dir.join("chat_data").join("history.json");
    config.history.max_entries = 2;
    config.trends.data_file = dir.join("trend_data.json");
    config.trends.topic_count = 2;
    config.plugins.directory = dir.join("plugins");
    config.plugins.builtins = vec![BuiltinPlugin::WorldTime];
    config.mascot.persona = "You are a rabbit.".to_string();
    config
}

struct Session {
    chat: ChatService,
    events: mpsc::Receiver<ChatEvent>,
    history: Arc<JsonHistoryStore>,
    llm: Arc<ScriptedLLM>,
}

fn session(config: &Config) -> Session {
    let history = Arc::new(JsonHistoryStore::new(&config.history.file, config.history.max_entries));
    let llm = Arc::new(ScriptedLLM::default());

    let mut manager = PluginManager::new();
    manager.load_from_config(config).unwrap();

    let generator = ReplyGenerator::from_config(
        config,
        Arc::new(PassthroughTranslator),
        llm.clone(),
        history.clone(),
    );

    let mut commands = CommandService::new("/").with_legend(manager.legend());
    commands.register_defaults(
        manager.list_plugins(),
        history.clone(),
        &config.mascot.user_label,
        &config.mascot.name,
    );

    let (tx, events) = mpsc::channel(8);
    let chat = ChatService::new(
        InputParser::new("/", config.mascot.exit_keywords.clone()),
        commands,
        Arc::new(RwLock::new(manager)),
        Arc::new(generator),
        tx,
    );

    Session { chat, events, history, llm }
}

async fn next_entry(events: &mut mpsc::Receiver<ChatEvent>) -> mascot_chat::domain::entities::HistoryEntry {
    match events.recv().await.unwrap() {
        ChatEvent::NewMessage(entry) => entry,
        ChatEvent::Error(message) => panic!("generation failed: {}", message),
    }
}

#[tokio::test]
async fn test_model_reply_with_trend_topics_is_logged() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut trends = TrendData::new(Local::now().date_naive());
    trends.trending_words = vec!["cherry blossoms".to_string()];
    trends.write(&config.trends.data_file).unwrap();

    let mut s = session(&config);
    assert!(matches!(s.chat.handle_input("こんにちは").await, InputOutcome::Pending { .. }));

    let entry = next_entry(&mut s.events).await;
    assert_eq!(entry.input, "こんにちは");
    assert_eq!(entry.response, "うさぎだよ");

    let prompts = s.llm.prompts.lock().unwrap().clone();
    assert_eq!(
        prompts[0][0].content,
        "You are a rabbit. Current topics people are talking about: cherry blossoms."
    );
    assert_eq!(prompts[0][1], LLMMessage::user("こんにちは"));

    assert!(config.history.file.exists());
    assert_eq!(s.history.load().unwrap(), vec![entry]);
}

#[tokio::test]
async fn test_stale_trends_are_ignored_and_history_is_capped() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut trends = TrendData::new(Local::now().date_naive() - chrono::Duration::days(30));
    trends.trending_words = vec!["old news".to_string()];
    trends.write(&config.trends.data_file).unwrap();

    let mut s = session(&config);
    for text in ["一", "二", "三"] {
        s.chat.handle_input(text).await;
        next_entry(&mut s.events).await;
    }

    let prompts = s.llm.prompts.lock().unwrap().clone();
    assert!(prompts.iter().all(|p| p[0].content == "You are a rabbit."));

    let inputs: Vec<String> = s.history.load().unwrap().into_iter().map(|e| e.input).collect();
    assert_eq!(inputs, vec!["二", "三"]);

    match s.chat.handle_input("/history 1").await {
        InputOutcome::Command(text) => assert!(text.contains("👹: 三")),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_plugin_answers_before_model() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let s = session(&config);

    match s.chat.handle_input("時刻 ロンドン").await {
        InputOutcome::Plugin { reply, .. } => {
            assert!(reply.text.starts_with("🕒 ロンドンの現在時刻: "));
            assert!(reply.render("mascot").contains("mascot(プラグイン): 🕒"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(s.llm.prompts.lock().unwrap().is_empty());

    match s.chat.handle_input("/help").await {
        InputOutcome::Command(text) => assert!(text.contains("■ World Time Info")),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(matches!(s.chat.handle_input("ばいばい").await, InputOutcome::Exit));
}

#[cfg(unix)]
#[tokio::test]
async fn test_manifest_plugin_runs_after_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.plugins.directory).unwrap();
    std::fs::write(
        config.plugins.directory.join("echo.yaml"),
        "name: Echo\nusage: 'おうむ返し：echo+半角SP+文章'\ntrigger: 'echo '\nexec:\n  command: echo\n  args: ['${query}']\n",
    )
    .unwrap();

    let s = session(&config);
    match s.chat.handle_input("echo やっほー").await {
        InputOutcome::Plugin { reply, .. } => assert_eq!(reply.text, "やっほー"),
        other => panic!("unexpected outcome: {:?}", other),
    }

    match s.chat.handle_input("/plugins").await {
        InputOutcome::Command(text) => {
            let world = text.find("World Time Info").unwrap();
            let echo = text.find("Echo").unwrap();
            assert!(world < echo);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}
