//! Plugin system for mascot-chat
//!
//! Plugins are offered each message in order; the first one that answers
//! wins and the dialogue model is skipped.

pub mod manager;
pub mod trait_def;
pub mod builtin;

pub use manager::{PluginManager, PluginInfo, SharedPluginManager};
pub use trait_def::{Plugin, BuiltinPlugin, PluginReply};
