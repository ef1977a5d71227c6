//! Prompt assembly for the dialogue model

use rand::seq::SliceRandom;
use rand::Rng;

use crate::infrastructure::llm::LLMMessage;
use crate::infrastructure::trends::TrendData;

/// Builds the message list sent to the model
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    persona: String,
    topic_count: usize,
}

impl PromptBuilder {
    pub fn new(persona: impl Into<String>, topic_count: usize) -> Self {
        Self {
            persona: persona.into(),
            topic_count,
        }
    }

    /// Up to `topic_count` distinct non-empty trending words, sampled at random
    pub fn pick_topics<R: Rng + ?Sized>(&self, trends: &TrendData, rng: &mut R) -> Vec<String> {
        let mut words: Vec<String> = Vec::new();
        for word in &trends.trending_words {
            let word = word.trim();
            if !word.is_empty() && !words.iter().any(|w| w == word) {
                words.push(word.to_string());
            }
        }
        words.shuffle(rng);
        words.truncate(self.topic_count);
        words
    }

    pub fn build<R: Rng + ?Sized>(
        &self,
        user_text: &str,
        trends: Option<&TrendData>,
        rng: &mut R,
    ) -> Vec<LLMMessage> {
        let mut system = self.persona.trim().to_string();

        let topics = trends
            .map(|t| self.pick_topics(t, rng))
            .unwrap_or_default();
        if !topics.is_empty() {
            if !system.is_empty() {
                system.push(' ');
            }
            system.push_str(&format!(
                "Current topics people are talking about: {}.",
                topics.join("; ")
            ));
        }

        let mut messages = Vec::with_capacity(2);
        if !system.is_empty() {
            messages.push(LLMMessage::system(system));
        }
        messages.push(LLMMessage::user(user_text));
        messages
    }
}
