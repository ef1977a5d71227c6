//! LLM Providers

pub mod groq;
pub mod huggingface;

pub use groq::GroqProvider;
pub use huggingface::HuggingFaceProvider;
