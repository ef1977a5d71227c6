//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Conversation history persistence
//! - Adapters: Front-ends (console)
//! - LLM, Translate: Remote dialogue and translation services
//! - Trends: Topic scraping for prompts
//! - Plugins: Manifest-described external command plugins

pub mod config;
pub mod storage;
pub mod adapters;
pub mod llm;
pub mod translate;
pub mod trends;
pub mod plugins;
