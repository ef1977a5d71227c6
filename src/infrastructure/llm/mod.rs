//! LLM integration - dialogue model providers

pub mod traits;
pub mod config;
pub mod providers;

#[cfg(test)]
mod tests;

pub use traits::{LLM, LLMMessage, LLMResponse, LLMError, LLMResult, Role, Sampling};
pub use config::{LLMConfig, LLMProvider};
pub use providers::{GroqProvider, HuggingFaceProvider};
