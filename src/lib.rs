//! mascot-chat - a chat companion that routes messages to rule-based plugins
//! or a translated round trip through a conversational model.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod plugins;
