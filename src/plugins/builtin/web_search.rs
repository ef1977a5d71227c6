//! Encyclopedia lookup plugin: `検索 <キーワード>`

use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::application::errors::{PluginError, PluginResult};
use crate::infrastructure::config::SearchConfig;
use crate::plugins::Plugin;

// `\s` is ASCII-only here, so the ideographic space is listed explicitly
const PATTERN: &str = "^検索[\\s\u{3000}]+(.+)$";

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(default)]
    extract: Option<String>,
}

pub struct WebSearchPlugin {
    client: Client,
    pattern: Regex,
    wikipedia_url: String,
    google_url: String,
    yahoo_url: String,
}

impl WebSearchPlugin {
    pub fn from_config(config: &SearchConfig) -> PluginResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PluginError::Load(e.to_string()))?;
        let pattern = Regex::new(PATTERN).map_err(|e| PluginError::Load(e.to_string()))?;

        Ok(Self {
            client,
            pattern,
            wikipedia_url: config.wikipedia_url.clone(),
            google_url: config.google_url.clone(),
            yahoo_url: config.yahoo_url.clone(),
        })
    }

    /// The query of a `検索 ...` message, whole-message match only
    pub fn query<'a>(&self, text: &'a str) -> Option<&'a str> {
        let caps = self.pattern.captures(text.trim())?;
        let query = caps.get(1)?.as_str().trim();
        (!query.is_empty()).then_some(query)
    }

    fn summary_url(&self, query: &str) -> Option<Url> {
        let base = self.wikipedia_url.trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, quote(query))).ok()
    }

    async fn lookup(&self, query: &str) -> Option<String> {
        let url = self.summary_url(query)?;
        tracing::debug!("Looking up summary: {}", url);

        let response = match self.client.get(url).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::info!("No summary for '{}' ({})", query, r.status());
                return None;
            }
            Err(e) => {
                tracing::warn!("Summary request failed: {}", e);
                return None;
            }
        };

        let summary: Summary = response.json().await.ok()?;
        summary.extract.filter(|e| !e.trim().is_empty())
    }

    pub fn fallback(&self, query: &str) -> String {
        let google = search_link(&self.google_url, "q", query);
        let yahoo = search_link(&self.yahoo_url, "p", query);
        format!(
            "「{}」に関する情報は見つかりませんでした。\nGoogle検索: {}\nYahoo検索: {}",
            query, google, yahoo
        )
    }
}

fn search_link(base: &str, key: &str, query: &str) -> String {
    format!("{}?{}={}", base, key, quote(query))
}

/// Percent-encode every byte outside the unreserved set, keeping `/`
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[async_trait]
impl Plugin for WebSearchPlugin {
    fn name(&self) -> &str {
        "Wikipedia Search"
    }

    fn description(&self) -> &str {
        "Wikipedia summary with search engine links as fallback"
    }

    fn usage(&self) -> Option<&str> {
        Some("検索：検索+半角SP+検索内容")
    }

    async fn on_message(&self, text: &str) -> Option<String> {
        let query = self.query(text)?;
        match self.lookup(query).await {
            Some(extract) => Some(extract),
            None => Some(self.fallback(query)),
        }
    }
}
