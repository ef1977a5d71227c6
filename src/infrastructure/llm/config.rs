//! LLM Configuration

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::providers::{GroqProvider, HuggingFaceProvider};
use super::traits::{LLMError, LLMResult, LLM};

/// LLM Provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    #[default]
    HuggingFace,
    Groq,
}

impl LLMProvider {
    pub fn as_str(&self) -> &str {
        match self {
            LLMProvider::HuggingFace => "huggingface",
            LLMProvider::Groq => "groq",
        }
    }
}

/// LLM Configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LLMConfig {
    /// Default provider
    pub provider: LLMProvider,

    /// Provider-specific API keys
    pub huggingface_api_key: Option<String>,
    pub groq_api_key: Option<String>,

    /// Default model for each provider
    pub huggingface_model: Option<String>,
    pub groq_model: Option<String>,

    /// Default settings
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::HuggingFace,
            huggingface_api_key: None,
            groq_api_key: None,
            huggingface_model: Some("facebook/blenderbot-3B".to_string()),
            groq_model: Some("llama-3.1-8b-instant".to_string()),
            temperature: 0.7,
            max_tokens: Some(256),
            timeout_secs: 120,
        }
    }
}

impl LLMConfig {
    /// Get API key for a provider
    pub fn api_key(&self, provider: LLMProvider) -> Option<&str> {
        match provider {
            LLMProvider::HuggingFace => self.huggingface_api_key.as_deref(),
            LLMProvider::Groq => self.groq_api_key.as_deref(),
        }
    }

    /// Get model for a provider
    pub fn model(&self, provider: LLMProvider) -> &str {
        match provider {
            LLMProvider::HuggingFace => self.huggingface_model.as_deref().unwrap_or("facebook/blenderbot-3B"),
            LLMProvider::Groq => self.groq_model.as_deref().unwrap_or("llama-3.1-8b-instant"),
        }
    }

    /// Build the configured provider
    pub fn create_provider(&self) -> LLMResult<Arc<dyn LLM>> {
        let api_key = self
            .api_key(self.provider)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LLMError::MissingApiKey(self.provider.as_str().to_string()))?;
        let model = self.model(self.provider);

        let provider: Arc<dyn LLM> = match self.provider {
            LLMProvider::HuggingFace => Arc::new(HuggingFaceProvider::new(api_key, model, self.timeout_secs)?),
            LLMProvider::Groq => Arc::new(GroqProvider::new(api_key, model, self.timeout_secs)?),
        };
        Ok(provider)
    }
}
