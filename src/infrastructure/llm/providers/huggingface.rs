//! Hugging Face hosted inference provider (text2text dialogue models)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::infrastructure::llm::{LLMError, LLMMessage, LLMResponse, LLMResult, Sampling, LLM};

/// Inference API endpoint
const API_BASE: &str = "https://api-inference.huggingface.co/models";

/// Hugging Face provider
pub struct HuggingFaceProvider {
    api_key: String,
    client: Client,
    model: String,
    api_base: String,
}

impl HuggingFaceProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> LLMResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LLMError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            api_key: api_key.into(),
            client,
            model: model.into(),
            api_base: API_BASE.to_string(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn model_url(&self) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), self.model)
    }
}

/// Dialogue models take a single text input; context goes first
pub(crate) fn flatten_messages(messages: &[LLMMessage]) -> String {
    messages
        .iter()
        .map(|m| m.content.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_new_tokens: Option<u32>,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Deserialize, Debug)]
struct Generation {
    generated_text: String,
}

#[async_trait]
impl LLM for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: &[LLMMessage], sampling: Sampling) -> LLMResult<LLMResponse> {
        let inputs = flatten_messages(messages);
        if inputs.is_empty() {
            return Err(LLMError::InvalidRequest("Empty input".to_string()));
        }

        let request = InferenceRequest {
            inputs,
            parameters: InferenceParameters {
                temperature: sampling.temperature,
                max_new_tokens: sampling.max_tokens,
            },
            options: InferenceOptions { wait_for_model: true },
        };

        let response = self.client
            .post(self.model_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status(status, body));
        }

        let generations: Vec<Generation> = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        let generation = generations
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::ParseError("No generations in response".to_string()))?;

        Ok(LLMResponse::new(&generation.generated_text, &self.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_messages_skips_empty() {
        let messages = vec![
            LLMMessage::system("You are a rabbit."),
            LLMMessage::system("  "),
            LLMMessage::user(" Hello! "),
        ];
        assert_eq!(flatten_messages(&messages), "You are a rabbit.\nHello!");
    }

    #[test]
    fn test_model_url() {
        let provider = HuggingFaceProvider::new("key", "facebook/blenderbot-3B", 5)
            .unwrap()
            .with_api_base("http://localhost:9/models/");
        assert_eq!(provider.model_url(), "http://localhost:9/models/facebook/blenderbot-3B");
    }
}
