//! Internal link suggestion handler (local computation).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use dispatch_common::{HandlerDescriptor, HandlerSource};

use crate::engine::{ExecuteContext, Handler, HandlerError, HandlerResult};
use crate::provider::ConfigProvider;

const CAPABILITY: &str = "links:internal";

/// Suggests internal links by matching existing page titles against the
/// draft text. Keyword overlap only; no semantic model involved.
pub struct InternalLinksHandler {
    descriptor: HandlerDescriptor,
}

#[derive(Debug, Deserialize)]
struct LinksInput {
    text: String,
    pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    url: String,
    title: String,
}

impl InternalLinksHandler {
    pub fn new() -> Self {
        Self {
            descriptor: HandlerDescriptor {
                id: "internal-link-suggester".to_string(),
                name: "Internal link suggester".to_string(),
                source: HandlerSource::Local,
                provider_id: None,
                capabilities: vec![CAPABILITY.to_string()],
                priority: 50,
            },
        }
    }

    /// Meaningful keywords from a title: lowercased words longer than
    /// three characters.
    fn keywords(title: &str) -> Vec<String> {
        title
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 3)
            .map(|w| w.to_lowercase())
            .collect()
    }

    fn suggest(input: &LinksInput) -> Vec<Value> {
        let text_lower = input.text.to_lowercase();
        let mut suggestions = Vec::new();

        for page in &input.pages {
            let matched: Vec<String> = Self::keywords(&page.title)
                .into_iter()
                .filter(|kw| text_lower.contains(kw.as_str()))
                .collect();
            if matched.is_empty() {
                continue;
            }
            suggestions.push(json!({
                "target": page.url,
                "title": page.title,
                "anchor": matched.join(" "),
                "matched_keywords": matched,
            }));
        }

        suggestions
    }
}

impl Default for InternalLinksHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for InternalLinksHandler {
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    fn check_availability(&self, config: &dyn ConfigProvider) -> bool {
        config.capability_settings(CAPABILITY).enabled
    }

    async fn execute(&self, input: &Value, _ctx: &ExecuteContext<'_>) -> HandlerResult {
        let input: LinksInput = serde_json::from_value(input.clone())
            .map_err(|e| HandlerError::InvalidInput(e.to_string()))?;
        if input.text.trim().is_empty() {
            return Err(HandlerError::InvalidInput("text must not be empty".into()));
        }
        let suggestions = Self::suggest(&input);
        Ok(json!({
            "suggestions": suggestions,
            "pages_considered": input.pages.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::EnvConfigProvider;
    use std::time::Duration;

    async fn run(input: Value) -> HandlerResult {
        let handler = InternalLinksHandler::new();
        let config = EnvConfigProvider::new();
        let ctx = ExecuteContext {
            config: &config,
            deadline: Duration::from_secs(5),
        };
        handler.execute(&input, &ctx).await
    }

    #[tokio::test]
    async fn test_suggests_matching_pages_only() {
        let result = run(json!({
            "text": "Our guide covers keyword research and content strategy in depth.",
            "pages": [
                {"url": "/keyword-research", "title": "Keyword Research Basics"},
                {"url": "/link-building", "title": "Link Building Tactics"}
            ]
        }))
        .await
        .unwrap();

        let suggestions = result["suggestions"].as_array().unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0]["target"], "/keyword-research");
        assert_eq!(result["pages_considered"], 2);
    }

    #[tokio::test]
    async fn test_short_title_words_ignored() {
        let result = run(json!({
            "text": "a an the of and",
            "pages": [{"url": "/x", "title": "A an the of"}]
        }))
        .await
        .unwrap();
        assert!(result["suggestions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let err = run(json!({"text": "", "pages": []})).await.unwrap_err();
        assert!(matches!(err, HandlerError::InvalidInput(_)));
    }
}
