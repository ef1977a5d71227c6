//! Groq chat completions (OpenAI-compatible API)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::infrastructure::llm::{LLMError, LLMMessage, LLMResponse, LLMResult, Sampling, LLM};

const API_BASE: &str = "https://api.groq.com/openai/v1";

pub struct GroqProvider {
    api_key: String,
    client: Client,
    model: String,
    api_base: String,
}

impl GroqProvider {
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

    /// Point the provider at another OpenAI-compatible endpoint
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [LLMMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Text of the first choice in a completion body
fn parse_completion(body: &str) -> LLMResult<String> {
    let completion: Completion = serde_json::from_str(body).map_err(|e| LLMError::ParseError(e.to_string()))?;
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::ParseError("No choices in response".to_string()))?;

    if choice.finish_reason.as_deref() == Some("length") {
        tracing::debug!("Reply was cut off at the token limit");
    }
    Ok(choice.message.content.unwrap_or_default())
}

#[async_trait]
impl LLM for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: &[LLMMessage], sampling: Sampling) -> LLMResult<LLMResponse> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| LLMError::NetworkError(e.to_string()))?;
        if !status.is_success() {
            return Err(LLMError::from_status(status, body));
        }

        let content = parse_completion(&body)?;
        Ok(LLMResponse::new(&content, &self.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let messages = [LLMMessage::system("You are a rabbit."), LLMMessage::user("hi")];
        let request = CompletionRequest {
            model: "llama-3.1-8b-instant",
            messages: &messages,
            temperature: Some(0.7),
            max_tokens: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_completion_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":" Hi there! "},"finish_reason":"stop"},{"message":{"content":"second"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), " Hi there! ");
    }

    #[test]
    fn test_parse_completion_without_choices() {
        assert!(matches!(parse_completion(r#"{"choices":[]}"#), Err(LLMError::ParseError(_))));
        assert!(matches!(parse_completion("not json"), Err(LLMError::ParseError(_))));
        assert_eq!(parse_completion(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap(), "");
    }

    #[test]
    fn test_completions_url() {
        let provider = GroqProvider::new("key", "m", 5).unwrap().with_api_base("http://localhost:9/v1/");
        assert_eq!(provider.completions_url(), "http://localhost:9/v1/chat/completions");
        assert_eq!(provider.model(), "m");
    }
}
