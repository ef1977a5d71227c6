//! Trend collection and the saved trend snapshot

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::crawler::WebCrawler;
use super::sources::{TopicItem, TrendSource};
use crate::application::errors::TrendError;
use crate::infrastructure::config::{TrendSourcesConfig, TrendsConfig};
use crate::infrastructure::translate::Translator;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Snapshot of scraped topics, saved as JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendData {
    pub date: String,
    #[serde(default)]
    pub trending_words: Vec<String>,
    #[serde(default)]
    pub topics: BTreeMap<String, Vec<TopicItem>>,
}

impl TrendData {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: date.format(DATE_FORMAT).to_string(),
            trending_words: Vec::new(),
            topics: BTreeMap::new(),
        }
    }

    /// Record a source's items under its topic and extend the word list
    pub fn add_topic(&mut self, topic: impl Into<String>, items: Vec<TopicItem>) {
        self.trending_words.extend(items.iter().map(|i| i.word().to_string()));
        self.topics.insert(topic.into(), items);
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TrendError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), TrendError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Output directory ensured: {}", parent.display());
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Age in days relative to `today`; `None` when the date does not parse
    pub fn age_days(&self, today: NaiveDate) -> Option<i64> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT)
            .ok()
            .map(|d| (today - d).num_days())
    }

    /// Usable for prompting: parsable date no older than `max_age_days`
    pub fn is_fresh(&self, today: NaiveDate, max_age_days: i64) -> bool {
        matches!(self.age_days(today), Some(age) if (0..=max_age_days).contains(&age))
    }

    /// Translate translatable topics and the word list into `target`
    pub async fn translate(&mut self, translator: &dyn Translator, source: &str, target: &str) {
        for trend_source in TrendSource::ALL.iter().filter(|s| s.translated()) {
            let Some(items) = self.topics.get_mut(trend_source.topic()) else {
                continue;
            };
            let words: Vec<String> = items.iter().map(|i| i.word().to_string()).collect();
            let translated = translator.translate_all(&words, source, target).await;
            for (item, word) in items.iter_mut().zip(translated) {
                match item {
                    TopicItem::Headline(s) => *s = word,
                    TopicItem::Movie(m) => m.title = word,
                }
            }
        }
        self.trending_words = translator.translate_all(&self.trending_words, source, target).await;
    }
}

/// Read trend data for prompting; missing, unreadable or stale data yields `None`
pub fn load_fresh(path: impl AsRef<Path>, max_age_days: i64) -> Option<TrendData> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No trend data at {}", path.display());
        return None;
    }
    match TrendData::load(path) {
        Ok(data) if data.is_fresh(Local::now().date_naive(), max_age_days) => Some(data),
        Ok(data) => {
            tracing::info!("Ignoring stale trend data from {}", data.date);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to read trend data: {}", e);
            None
        }
    }
}

/// Scrapes the enabled sources into a `TrendData`
pub struct TrendCollector {
    crawler: WebCrawler,
    sources: Vec<TrendSource>,
}

impl TrendCollector {
    pub fn new(config: &TrendsConfig) -> Result<Self, TrendError> {
        Ok(Self {
            crawler: WebCrawler::new(config.rate_limit_ms, config.max_per_minute)?,
            sources: enabled_sources(&config.sources),
        })
    }

    /// Fetch every enabled source; a failing source is logged and skipped
    pub fn collect(&self) -> TrendData {
        let mut data = TrendData::new(Local::now().date_naive());
        for source in &self.sources {
            tracing::info!("Fetching {} trends...", source.topic());
            match self.crawler.fetch(source.url()) {
                Ok(html) => {
                    let items = source.parse(&html);
                    tracing::info!("{} trends: {} items", source.topic(), items.len());
                    data.add_topic(source.topic(), items);
                }
                Err(e) => tracing::error!("Error fetching data from {}: {}", source.url(), e),
            }
        }
        data
    }
}

pub fn enabled_sources(config: &TrendSourcesConfig) -> Vec<TrendSource> {
    TrendSource::ALL
        .into_iter()
        .filter(|s| match s {
            TrendSource::Music => config.music,
            TrendSource::Movies => config.movies,
            TrendSource::Wikipedia => config.wikipedia,
            TrendSource::Chiebukuro => config.chiebukuro,
        })
        .collect()
}
