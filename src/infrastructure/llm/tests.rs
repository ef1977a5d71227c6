//! Tests for LLM providers

use reqwest::StatusCode;

use crate::infrastructure::llm::{
    GroqProvider, HuggingFaceProvider, LLMConfig, LLMError, LLMMessage, LLMProvider, Role, Sampling, LLM,
};

#[tokio::test]
#[ignore] // Requires GROQ_API_KEY environment variable
async fn test_groq_chat() {
    let api_key = std::env::var("GROQ_API_KEY").expect("GROQ_API_KEY not set");
    let provider = GroqProvider::new(api_key, "llama-3.1-8b-instant", 30).unwrap();

    let messages = vec![
        LLMMessage::system("You are a helpful assistant."),
        LLMMessage::user("Say 'hello' in exactly one word."),
    ];

    let response = provider.chat(&messages, Sampling::new(0.5, Some(10)))
        .await
        .expect("Chat request failed");

    assert!(!response.content.is_empty());
}

#[tokio::test]
#[ignore] // Requires HF_API_KEY environment variable
async fn test_huggingface_chat() {
    let api_key = std::env::var("HF_API_KEY").expect("HF_API_KEY not set");
    let provider = HuggingFaceProvider::new(api_key, "facebook/blenderbot-3B", 120).unwrap();

    let sampling = Sampling { max_tokens: Some(40), ..Sampling::default() };
    let response = provider.chat(&[LLMMessage::user("Hello, how are you?")], sampling)
        .await
        .expect("Inference request failed");

    assert!(!response.content.is_empty());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let provider = GroqProvider::new("key", "llama-3.1-8b-instant", 2)
        .unwrap()
        .with_api_base("http://127.0.0.1:9");

    let err = provider.chat(&[LLMMessage::user("hi")], Sampling::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::NetworkError(_)));
}

#[test]
fn test_create_provider_requires_key() {
    let config = LLMConfig::default();
    let err = config.create_provider().err().unwrap();
    assert!(matches!(err, LLMError::MissingApiKey(ref p) if p == "huggingface"));
}

#[test]
fn test_create_provider_selects_configured() {
    let config = LLMConfig {
        provider: LLMProvider::Groq,
        groq_api_key: Some("gsk_test".to_string()),
        ..LLMConfig::default()
    };
    let provider = config.create_provider().unwrap();
    assert_eq!(provider.name(), "groq");
    assert_eq!(provider.model(), "llama-3.1-8b-instant");
    assert_eq!(config.model(LLMProvider::HuggingFace), "facebook/blenderbot-3B");
}

#[test]
fn test_llm_message_builder() {
    let msg = LLMMessage::user("Hello");
    assert_eq!(msg.role, Role::User);
    assert_eq!(msg.content, "Hello");

    let json = serde_json::to_string(&LLMMessage::system("You are helpful.")).unwrap();
    assert_eq!(json, r#"{"role":"system","content":"You are helpful."}"#);
}

#[test]
fn test_status_mapping() {
    assert!(matches!(
        LLMError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
        LLMError::RateLimited
    ));
    assert!(matches!(
        LLMError::from_status(StatusCode::SERVICE_UNAVAILABLE, "loading".to_string()),
        LLMError::ModelLoading(ref body) if body == "loading"
    ));
    let err = LLMError::from_status(StatusCode::UNAUTHORIZED, "bad key".to_string());
    assert_eq!(err.to_string(), "API error (401): bad key");
}
