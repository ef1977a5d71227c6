//! Plugin trait definitions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Core plugin trait that all message handlers implement
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique identifier for the plugin
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// One-line usage hint shown in the legend
    fn usage(&self) -> Option<&str> {
        None
    }

    /// Handle a message. `None` means the plugin does not handle it and the
    /// next plugin is consulted.
    async fn on_message(&self, text: &str) -> Option<String>;

    /// Optional: Get plugin metadata
    fn metadata(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// Built-in plugins that can be enabled from config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuiltinPlugin {
    Weather,
    WorldTime,
    WebSearch,
}

impl BuiltinPlugin {
    pub fn as_str(&self) -> &str {
        match self {
            BuiltinPlugin::Weather => "weather",
            BuiltinPlugin::WorldTime => "world-time",
            BuiltinPlugin::WebSearch => "web-search",
        }
    }
}

/// Reply produced by the first matching plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginReply {
    pub plugin: String,
    pub text: String,
}

impl PluginReply {
    pub fn new(plugin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            text: text.into(),
        }
    }
}
