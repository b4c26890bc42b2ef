//! Author matching handler (local computation).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use dispatch_common::{HandlerDescriptor, HandlerSource};

use crate::engine::{ExecuteContext, Handler, HandlerError, HandlerResult};
use crate::provider::ConfigProvider;

const CAPABILITY: &str = "author:match";

/// Picks the best-matching author profile for a topic by token overlap
/// between the topic and each profile's expertise list.
pub struct AuthorMatchHandler {
    descriptor: HandlerDescriptor,
}

#[derive(Debug, Deserialize)]
struct MatchInput {
    topic: String,
    authors: Vec<AuthorProfile>,
}

#[derive(Debug, Clone, Deserialize)]
struct AuthorProfile {
    name: String,
    #[serde(default)]
    expertise: Vec<String>,
}

impl AuthorMatchHandler {
    pub fn new() -> Self {
        Self {
            descriptor: HandlerDescriptor {
                id: "author-matcher".to_string(),
                name: "Author matcher".to_string(),
                source: HandlerSource::Local,
                provider_id: None,
                capabilities: vec![CAPABILITY.to_string()],
                priority: 50,
            },
        }
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2)
            .map(|w| w.to_lowercase())
            .collect()
    }

    fn score(topic_tokens: &[String], profile: &AuthorProfile) -> usize {
        profile
            .expertise
            .iter()
            .flat_map(|e| Self::tokens(e))
            .filter(|token| topic_tokens.contains(token))
            .count()
    }
}

impl Default for AuthorMatchHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for AuthorMatchHandler {
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    fn check_availability(&self, config: &dyn ConfigProvider) -> bool {
        config.capability_settings(CAPABILITY).enabled
    }

    async fn execute(&self, input: &Value, _ctx: &ExecuteContext<'_>) -> HandlerResult {
        let input: MatchInput = serde_json::from_value(input.clone())
            .map_err(|e| HandlerError::InvalidInput(e.to_string()))?;
        if input.authors.is_empty() {
            return Err(HandlerError::InvalidInput(
                "at least one author profile is required".into(),
            ));
        }

        let topic_tokens = Self::tokens(&input.topic);
        let (best, score) = input
            .authors
            .iter()
            .map(|profile| (profile, Self::score(&topic_tokens, profile)))
            .max_by_key(|(_, score)| *score)
            .expect("authors is non-empty");

        Ok(json!({
            "author": best.name,
            "score": score,
            "considered": input.authors.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::EnvConfigProvider;
    use std::time::Duration;

    async fn run(input: Value) -> HandlerResult {
        let handler = AuthorMatchHandler::new();
        let config = EnvConfigProvider::new();
        let ctx = ExecuteContext {
            config: &config,
            deadline: Duration::from_secs(5),
        };
        handler.execute(&input, &ctx).await
    }

    #[tokio::test]
    async fn test_picks_best_overlap() {
        let result = run(json!({
            "topic": "gardening tips for small urban spaces",
            "authors": [
                {"name": "Finance Fred", "expertise": ["investing", "crypto markets"]},
                {"name": "Garden Gail", "expertise": ["urban gardening", "container plants"]}
            ]
        }))
        .await
        .unwrap();

        assert_eq!(result["author"], "Garden Gail");
        assert!(result["score"].as_u64().unwrap() >= 2);
        assert_eq!(result["considered"], 2);
    }

    #[tokio::test]
    async fn test_no_authors_rejected() {
        let err = run(json!({"topic": "anything", "authors": []}))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_zero_overlap_still_picks_someone() {
        let result = run(json!({
            "topic": "quantum entanglement",
            "authors": [{"name": "Only Author", "expertise": ["cooking"]}]
        }))
        .await
        .unwrap();
        assert_eq!(result["author"], "Only Author");
        assert_eq!(result["score"], 0);
    }
}
