//! Machine translation between the user's language and the model's language

pub mod google;

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::errors::TranslateError;
use crate::infrastructure::config::{TranslationConfig, TranslationProvider};

pub use google::GoogleTranslator;

/// Translation service
#[async_trait]
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    /// Translate `text` from `source` to `target` (ISO 639-1 codes)
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError>;

    /// Translate each item; on the first failure the originals are returned
    async fn translate_all(&self, items: &[String], source: &str, target: &str) -> Vec<String> {
        let mut translated = Vec::with_capacity(items.len());
        for item in items {
            match self.translate(item, source, target).await {
                Ok(t) => translated.push(t),
                Err(e) => {
                    tracing::error!("Translation error: {}", e);
                    return items.to_vec();
                }
            }
        }
        translated
    }
}

/// Returns text unchanged; used when the model already speaks the user's language
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    fn name(&self) -> &str {
        "none"
    }

    async fn translate(&self, text: &str, _source: &str, _target: &str) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }
}

/// Build the configured translator
pub fn create_translator(config: &TranslationConfig) -> Result<Arc<dyn Translator>, TranslateError> {
    let translator: Arc<dyn Translator> = match config.provider {
        TranslationProvider::Google => Arc::new(GoogleTranslator::new(&config.endpoint, config.timeout_secs)?),
        TranslationProvider::None => Arc::new(PassthroughTranslator),
    };
    Ok(translator)
}
