//! Manifest plugins for mascot-chat
//!
//! Each YAML manifest in the plugin directory describes an external command
//! that answers messages starting with a trigger prefix.

pub mod loader;
pub mod manifest;
pub mod exec;

pub use loader::PluginLoader;
pub use manifest::{PluginManifest, ExecConfig};
pub use exec::ExecPlugin;
