//! Content quality scoring handler (local computation).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use dispatch_common::{HandlerDescriptor, HandlerSource};

use crate::engine::{ExecuteContext, Handler, HandlerError, HandlerResult};
use crate::provider::ConfigProvider;

const CAPABILITY: &str = "content:quality";

/// Scores draft content for readability and structure without calling
/// out to any provider. Serves as the local fallback when no scoring
/// provider is configured.
pub struct ContentQualityHandler {
    descriptor: HandlerDescriptor,
}

#[derive(Debug, Deserialize)]
struct QualityInput {
    text: String,
}

impl ContentQualityHandler {
    pub fn new() -> Self {
        Self {
            descriptor: HandlerDescriptor {
                id: "content-quality-scorer".to_string(),
                name: "Content quality scorer".to_string(),
                source: HandlerSource::Local,
                provider_id: None,
                capabilities: vec![CAPABILITY.to_string()],
                priority: 50,
            },
        }
    }

    fn score(text: &str) -> Value {
        let words: Vec<&str> = text.split_whitespace().collect();
        let word_count = words.len();

        let sentence_count = text
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count()
            .max(1);
        let avg_sentence_length = word_count as f64 / sentence_count as f64;

        let paragraph_count = text
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .count()
            .max(1);
        let heading_count = text
            .lines()
            .filter(|line| line.trim_start().starts_with('#'))
            .count();

        let mut score: f64 = 100.0;

        // Long sentences hurt readability.
        if avg_sentence_length > 25.0 {
            score -= ((avg_sentence_length - 25.0) * 2.0).min(30.0);
        }
        // Thin content.
        if word_count < 300 {
            score -= ((300 - word_count) as f64 / 300.0 * 40.0).min(40.0);
        }
        // Walls of text.
        let avg_paragraph_words = word_count as f64 / paragraph_count as f64;
        if avg_paragraph_words > 150.0 {
            score -= 10.0;
        }
        // Structure bonus for headings in longer pieces.
        if word_count >= 300 && heading_count == 0 {
            score -= 10.0;
        }

        let score = score.clamp(0.0, 100.0).round() as u32;

        json!({
            "score": score,
            "metrics": {
                "word_count": word_count,
                "sentence_count": sentence_count,
                "avg_sentence_length": (avg_sentence_length * 10.0).round() / 10.0,
                "paragraph_count": paragraph_count,
                "heading_count": heading_count,
            }
        })
    }
}

impl Default for ContentQualityHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for ContentQualityHandler {
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    fn check_availability(&self, config: &dyn ConfigProvider) -> bool {
        config.capability_settings(CAPABILITY).enabled
    }

    async fn execute(&self, input: &Value, _ctx: &ExecuteContext<'_>) -> HandlerResult {
        let input: QualityInput = serde_json::from_value(input.clone())
            .map_err(|e| HandlerError::InvalidInput(e.to_string()))?;
        if input.text.trim().is_empty() {
            return Err(HandlerError::InvalidInput("text must not be empty".into()));
        }
        Ok(Self::score(&input.text))
    }
}
