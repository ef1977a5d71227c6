//! Dialogue model interface shared by the hosted providers

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Who a prompt line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Persona and topic context
    System,
    User,
}

/// One line of the prompt sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMMessage {
    pub role: Role,
    pub content: String,
}

impl LLMMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Sampling settings for a single reply; `None` leaves the provider default
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sampling {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Sampling {
    pub fn new(temperature: f32, max_tokens: Option<u32>) -> Self {
        Self {
            temperature: Some(temperature),
            max_tokens,
        }
    }
}

/// The model's reply, trimmed
#[derive(Debug, Clone, PartialEq)]
pub struct LLMResponse {
    pub content: String,
    /// Model that produced the reply
    pub model: String,
}

impl LLMResponse {
    pub fn new(content: &str, model: impl Into<String>) -> Self {
        Self {
            content: content.trim().to_string(),
            model: model.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LLMError {
    #[error("Missing API key for {0}")]
    MissingApiKey(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Rate limited, try again later")]
    RateLimited,

    /// Hosted models answer 503 while they are being loaded
    #[error("Model is loading: {0}")]
    ModelLoading(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("{0} returned an empty reply")]
    EmptyReply(String),
}

impl LLMError {
    /// Error for a non-success HTTP answer
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => LLMError::RateLimited,
            StatusCode::SERVICE_UNAVAILABLE => LLMError::ModelLoading(body),
            status => LLMError::ApiError {
                status: status.as_u16(),
                body,
            },
        }
    }
}

pub type LLMResult<T> = Result<T, LLMError>;

/// A hosted dialogue model
#[async_trait]
pub trait LLM: Send + Sync {
    /// Provider name, for logs
    fn name(&self) -> &str;

    /// Model identifier requests go to
    fn model(&self) -> &str;

    /// Generate a reply to `messages`
    async fn chat(&self, messages: &[LLMMessage], sampling: Sampling) -> LLMResult<LLMResponse>;
}
