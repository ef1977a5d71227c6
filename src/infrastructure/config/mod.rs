//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::application::errors::ConfigError;
use crate::infrastructure::llm::{LLMConfig, LLMProvider};
use crate::plugins::BuiltinPlugin;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub mascot: MascotConfig,
    pub plugins: PluginConfig,
    pub weather: WeatherConfig,
    pub search: SearchConfig,
    pub llm: LLMConfig,
    pub translation: TranslationConfig,
    pub trends: TrendsConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MascotConfig {
    pub name: String,
    pub user_label: String,
    /// System persona for the dialogue model, written in the model language
    pub persona: String,
    /// Any of these inside the input ends the session
    pub exit_keywords: Vec<String>,
}

impl Default for MascotConfig {
    fn default() -> Self {
        Self {
            name: "mascot".to_string(),
            user_label: "あなた".to_string(),
            persona: "You are a cheerful rabbit mascot who chats casually with your friend.".to_string(),
            exit_keywords: ["exit", "bye", "quit", "ばいばい", "さようなら", "またあとで"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PluginConfig {
    pub enabled: bool,
    /// Directory scanned for plugin manifests
    pub directory: PathBuf,
    /// Built-in plugins, in dispatch order
    pub builtins: Vec<BuiltinPlugin>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("./plugins"),
            builtins: vec![
                BuiltinPlugin::Weather,
                BuiltinPlugin::WorldTime,
                BuiltinPlugin::WebSearch,
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WeatherConfig {
    /// JSON table: prefecture -> region code -> city -> city code
    pub mapping_file: PathBuf,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            mapping_file: PathBuf::from("prefecture_city_mapping.json"),
            base_url: "https://weather.yahoo.co.jp/weather".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SearchConfig {
    pub wikipedia_url: String,
    pub google_url: String,
    pub yahoo_url: String,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            wikipedia_url: "https://ja.wikipedia.org/api/rest_v1/page/summary".to_string(),
            google_url: "https://www.google.com/search".to_string(),
            yahoo_url: "https://search.yahoo.co.jp/search".to_string(),
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    Google,
    None,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TranslationConfig {
    pub provider: TranslationProvider,
    pub endpoint: String,
    /// Language the user types in
    pub user_language: String,
    /// Language the dialogue model understands
    pub model_language: String,
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::Google,
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            user_language: "ja".to_string(),
            model_language: "en".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TrendsConfig {
    pub data_file: PathBuf,
    /// How many trending words are mixed into the prompt
    pub topic_count: usize,
    /// Trend data older than this is ignored
    pub max_age_days: i64,
    /// Translate scraped headlines into the model language before saving
    pub translate: bool,
    pub rate_limit_ms: u64,
    pub max_per_minute: u32,
    pub sources: TrendSourcesConfig,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("chat_data/trend_data.json"),
            topic_count: 3,
            max_age_days: 7,
            translate: true,
            rate_limit_ms: 1000,
            max_per_minute: 20,
            sources: TrendSourcesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TrendSourcesConfig {
    pub music: bool,
    pub movies: bool,
    pub wikipedia: bool,
    pub chiebukuro: bool,
}

impl Default for TrendSourcesConfig {
    fn default() -> Self {
        Self {
            music: true,
            movies: true,
            wikipedia: true,
            chiebukuro: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HistoryConfig {
    pub file: PathBuf,
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("conversation_history.json"),
            max_entries: 100,
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, fall back to defaults, then apply env overrides
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = if path.exists() {
            Config::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            })
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Config::default()
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (the process environment in practice) and validate the result
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(key) = lookup("GROQ_API_KEY") {
            self.llm.groq_api_key = Some(key);
        }
        if let Some(key) = lookup("HF_API_KEY") {
            self.llm.huggingface_api_key = Some(key);
        }
        if let Some(provider) = lookup("LLM_PROVIDER") {
            match provider.to_lowercase().as_str() {
                "groq" => self.llm.provider = LLMProvider::Groq,
                "huggingface" => self.llm.provider = LLMProvider::HuggingFace,
                other => tracing::warn!("Unknown LLM_PROVIDER '{}', keeping {:?}", other, self.llm.provider),
            }
        }
        if let Some(prompt) = lookup("LLM_SYSTEM_PROMPT") {
            self.mascot.persona = prompt;
        }
        if let Some(temp) = lookup("LLM_TEMPERATURE") {
            self.llm.temperature = temp
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("LLM_TEMPERATURE is not a number: {}", temp)))?;
        }
        if let Some(path) = lookup("MASCOT_HISTORY_FILE") {
            self.history.file = PathBuf::from(path);
        }
        if let Some(path) = lookup("MASCOT_TREND_FILE") {
            self.trends.data_file = PathBuf::from(path);
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mascot.name.trim().is_empty() {
            return Err(ConfigError::MissingField("mascot.name".to_string()));
        }
        if self.history.max_entries == 0 {
            return Err(ConfigError::InvalidValue("history.max-entries must be at least 1".to_string()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidValue(format!(
                "llm.temperature out of range: {}",
                self.llm.temperature
            )));
        }
        Ok(())
    }
}
