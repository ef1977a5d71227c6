//! Plugin manager - holds the ordered plugin list and dispatches messages

use crate::application::errors::{PluginError, PluginResult};
use crate::infrastructure::config::Config;
use crate::infrastructure::plugins::PluginLoader;
use crate::plugins::builtin::{WeatherPlugin, WebSearchPlugin, WorldTimePlugin};
use crate::plugins::trait_def::{BuiltinPlugin, Plugin, PluginReply};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Manages all plugins for the chat, in dispatch order
#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin at the end of the dispatch order
    pub fn register<P: Plugin + 'static>(&mut self, plugin: P) -> PluginResult<()> {
        self.register_arc(Arc::new(plugin))
    }

    pub fn register_arc(&mut self, plugin: Arc<dyn Plugin>) -> PluginResult<()> {
        let name = plugin.name().to_string();

        if self.has_plugin(&name) {
            return Err(PluginError::AlreadyRegistered(name));
        }

        info!("Registering plugin: {}", name);
        self.plugins.push(plugin);
        Ok(())
    }

    /// Unregister a plugin
    pub fn unregister(&mut self, name: &str) -> PluginResult<()> {
        let before = self.plugins.len();
        self.plugins.retain(|p| p.name() != name);
        if self.plugins.len() < before {
            info!("Unregistered plugin: {}", name);
            Ok(())
        } else {
            Err(PluginError::NotFound(name.to_string()))
        }
    }

    /// Offer a message to each plugin in order; the first reply wins
    pub async fn dispatch(&self, text: &str) -> Option<PluginReply> {
        for plugin in &self.plugins {
            match plugin.on_message(text).await {
                Some(reply) if !reply.is_empty() => {
                    debug!("Plugin '{}' handled message", plugin.name());
                    return Some(PluginReply::new(plugin.name(), reply));
                }
                _ => continue,
            }
        }
        None
    }

    /// List all registered plugins in dispatch order
    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        self.plugins.iter().map(|plugin| {
            PluginInfo {
                name: plugin.name().to_string(),
                description: plugin.description().to_string(),
                usage: plugin.usage().map(|u| u.to_string()),
                metadata: plugin.metadata(),
            }
        }).collect()
    }

    /// Usage legend for all plugins that declare one
    pub fn legend(&self) -> String {
        let mut legend = "【プラグイン操作凡例】\n".to_string();
        for plugin in &self.plugins {
            if let Some(usage) = plugin.usage() {
                legend.push_str(&format!("\n■ {}\n　・{}\n", plugin.name(), usage));
            }
        }
        legend
    }

    /// Check if a plugin exists
    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Load built-in plugins in configured order, then manifest plugins
    pub fn load_from_config(&mut self, config: &Config) -> PluginResult<()> {
        if !config.plugins.enabled {
            info!("Plugin system disabled");
            return Ok(());
        }

        for builtin in &config.plugins.builtins {
            let result = match builtin {
                BuiltinPlugin::Weather => WeatherPlugin::from_config(&config.weather)
                    .and_then(|p| self.register(p)),
                BuiltinPlugin::WorldTime => self.register(WorldTimePlugin::new()),
                BuiltinPlugin::WebSearch => WebSearchPlugin::from_config(&config.search)
                    .and_then(|p| self.register(p)),
            };
            if let Err(e) = result {
                warn!("Failed to load built-in plugin {}: {}", builtin.as_str(), e);
            }
        }

        let loader = PluginLoader::new(&config.plugins.directory);
        for plugin in loader.load_all()? {
            if let Err(e) = self.register_arc(plugin) {
                warn!("Skipping plugin: {}", e);
            }
        }

        Ok(())
    }
}

/// Plugin information for listing
#[derive(Debug, Clone, serde::Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
    pub usage: Option<String>,
    pub metadata: std::collections::HashMap<String, String>,
}

/// Shared handle; the async lock may be held across plugin awaits
pub type SharedPluginManager = Arc<RwLock<PluginManager>>;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct PrefixPlugin {
        name: String,
        prefix: String,
        reply: String,
        calls: Arc<AtomicUsize>,
    }

    impl PrefixPlugin {
        fn new(name: &str, prefix: &str, reply: &str) -> Self {
            Self {
                name: name.to_string(),
                prefix: prefix.to_string(),
                reply: reply.to_string(),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Plugin for PrefixPlugin {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            "test plugin"
        }

        fn usage(&self) -> Option<&str> {
            Some(&self.prefix)
        }

        async fn on_message(&self, text: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            text.starts_with(&self.prefix).then(|| self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let mut manager = PluginManager::new();
        let late = PrefixPlugin::new("late", "時刻", "late reply");
        let late_calls = late.calls.clone();
        manager.register(PrefixPlugin::new("early", "時刻", "early reply")).unwrap();
        manager.register(late).unwrap();

        let reply = manager.dispatch("時刻 東京").await.unwrap();
        assert_eq!(reply, PluginReply::new("early", "early reply"));
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_through_to_later_plugin() {
        let mut manager = PluginManager::new();
        manager.register(PrefixPlugin::new("weather", "天気予報 ", "sunny")).unwrap();
        manager.register(PrefixPlugin::new("clock", "時刻 ", "noon")).unwrap();

        let reply = manager.dispatch("時刻 パリ").await.unwrap();
        assert_eq!(reply.plugin, "clock");
        assert!(manager.dispatch("こんにちは").await.is_none());
    }

    #[tokio::test]
    async fn test_empty_reply_is_not_a_match() {
        let mut manager = PluginManager::new();
        manager.register(PrefixPlugin::new("silent", "", "")).unwrap();
        manager.register(PrefixPlugin::new("loud", "", "hi")).unwrap();

        assert_eq!(manager.dispatch("x").await.unwrap().plugin, "loud");
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut manager = PluginManager::new();
        manager.register(PrefixPlugin::new("a", "", "")).unwrap();
        let err = manager.register(PrefixPlugin::new("a", "", "")).unwrap_err();
        assert!(matches!(err, PluginError::AlreadyRegistered(name) if name == "a"));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_unregister_and_listing_order() {
        let mut manager = PluginManager::new();
        manager.register(PrefixPlugin::new("b", "", "")).unwrap();
        manager.register(PrefixPlugin::new("a", "", "")).unwrap();
        manager.register(PrefixPlugin::new("c", "", "")).unwrap();
        manager.unregister("a").unwrap();
        assert!(manager.unregister("a").is_err());

        let names: Vec<String> = manager.list_plugins().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_legend_lists_usage() {
        let mut manager = PluginManager::new();
        manager.register(PrefixPlugin::new("World Time Info", "時刻+半角SP+都市名", "")).unwrap();
        let legend = manager.legend();
        assert!(legend.contains("■ World Time Info"));
        assert!(legend.contains("時刻+半角SP+都市名"));
    }

    #[test]
    fn test_disabled_config_loads_nothing() {
        let mut config = Config::default();
        config.plugins.enabled = false;
        let mut manager = PluginManager::new();
        manager.load_from_config(&config).unwrap();
        assert!(manager.is_empty());
    }
}
