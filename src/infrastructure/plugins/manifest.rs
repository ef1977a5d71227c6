//! Plugin manifest definition

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::application::errors::PluginError;

/// Plugin metadata, read from a YAML file in the plugin directory
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginManifest {
    /// Plugin name (required)
    pub name: String,

    /// Plugin version
    #[serde(default = "default_version")]
    pub version: String,

    /// Plugin description
    pub description: Option<String>,

    /// Legend line shown by /help
    pub usage: Option<String>,

    /// Disabled manifests are skipped
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Lower runs earlier; ties are broken by file name
    #[serde(default = "default_priority")]
    pub priority: u32,

    /// Message prefix the plugin responds to
    pub trigger: String,

    /// External command that produces the reply
    pub exec: ExecConfig,
}

/// How to run an external plugin command
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExecConfig {
    pub command: String,

    /// Arguments; `${text}` is the whole message, `${query}` the text after the trigger
    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub working_directory: Option<PathBuf>,

    #[serde(default)]
    pub env: HashMap<String, String>,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_max_output")]
    pub max_output_bytes: usize,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_true() -> bool {
    true
}

fn default_priority() -> u32 {
    100
}

fn default_timeout() -> u64 {
    10
}

fn default_max_output() -> usize {
    4000
}

impl PluginManifest {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PluginError::Load(format!("Failed to read manifest: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, PluginError> {
        let manifest: PluginManifest = serde_yaml::from_str(content)
            .map_err(|e| PluginError::Load(format!("Failed to parse manifest: {}", e)))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), PluginError> {
        if self.name.trim().is_empty() {
            return Err(PluginError::Load("Manifest has an empty name".to_string()));
        }
        if self.trigger.trim().is_empty() {
            return Err(PluginError::Load(format!("Plugin '{}' has an empty trigger", self.name)));
        }
        if self.exec.command.trim().is_empty() {
            return Err(PluginError::Load(format!("Plugin '{}' has no exec command", self.name)));
        }
        if self.exec.timeout_seconds == 0 {
            return Err(PluginError::Load(format!("Plugin '{}' has a zero timeout", self.name)));
        }
        Ok(())
    }
}
