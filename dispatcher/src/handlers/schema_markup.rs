//! Schema markup (JSON-LD) generation handler (local computation).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use dispatch_common::{HandlerDescriptor, HandlerSource};

use crate::engine::{ExecuteContext, Handler, HandlerError, HandlerResult};
use crate::provider::ConfigProvider;

const CAPABILITY: &str = "schema:markup";

/// Generates JSON-LD structured data for a page from structured input
/// fields. Supports `Article` and `FAQPage` shapes.
pub struct SchemaMarkupHandler {
    descriptor: HandlerDescriptor,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", tag = "schema_type")]
enum MarkupInput {
    Article {
        headline: String,
        #[serde(default)]
        author: Option<String>,
        #[serde(default)]
        date_published: Option<String>,
        #[serde(default)]
        description: Option<String>,
    },
    Faq {
        questions: Vec<FaqEntry>,
    },
}

#[derive(Debug, Deserialize)]
struct FaqEntry {
    question: String,
    answer: String,
}

impl SchemaMarkupHandler {
    pub fn new() -> Self {
        Self {
            descriptor: HandlerDescriptor {
                id: "schema-markup-generator".to_string(),
                name: "Schema markup generator".to_string(),
                source: HandlerSource::Local,
                provider_id: None,
                capabilities: vec![CAPABILITY.to_string()],
                priority: 50,
            },
        }
    }

    fn generate(input: MarkupInput) -> Result<Value, HandlerError> {
        match input {
            MarkupInput::Article {
                headline,
                author,
                date_published,
                description,
            } => {
                if headline.trim().is_empty() {
                    return Err(HandlerError::InvalidInput(
                        "headline must not be empty".into(),
                    ));
                }
                let mut markup = json!({
                    "@context": "https://schema.org",
                    "@type": "Article",
                    "headline": headline,
                });
                if let Some(author) = author {
                    markup["author"] = json!({"@type": "Person", "name": author});
                }
                if let Some(date) = date_published {
                    markup["datePublished"] = json!(date);
                }
                if let Some(description) = description {
                    markup["description"] = json!(description);
                }
                Ok(json!({"markup": markup}))
            }
            MarkupInput::Faq { questions } => {
                if questions.is_empty() {
                    return Err(HandlerError::InvalidInput(
                        "at least one question is required".into(),
                    ));
                }
                let entities: Vec<Value> = questions
                    .iter()
                    .map(|q| {
                        json!({
                            "@type": "Question",
                            "name": q.question,
                            "acceptedAnswer": {"@type": "Answer", "text": q.answer}
                        })
                    })
                    .collect();
                Ok(json!({
                    "markup": {
                        "@context": "https://schema.org",
                        "@type": "FAQPage",
                        "mainEntity": entities,
                    }
                }))
            }
        }
    }
}

impl Default for SchemaMarkupHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for SchemaMarkupHandler {
    fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    fn check_availability(&self, config: &dyn ConfigProvider) -> bool {
        config.capability_settings(CAPABILITY).enabled
    }

    async fn execute(&self, input: &Value, _ctx: &ExecuteContext<'_>) -> HandlerResult {
        let input: MarkupInput = serde_json::from_value(input.clone())
            .map_err(|e| HandlerError::InvalidInput(e.to_string()))?;
        Self::generate(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::EnvConfigProvider;
    use std::time::Duration;

    async fn run(input: Value) -> HandlerResult {
        let handler = SchemaMarkupHandler::new();
        let config = EnvConfigProvider::new();
        let ctx = ExecuteContext {
            config: &config,
            deadline: Duration::from_secs(5),
        };
        handler.execute(&input, &ctx).await
    }

    #[tokio::test]
    async fn test_article_markup() {
        let result = run(json!({
            "schema_type": "article",
            "headline": "How to flip a website",
            "author": "Ada",
            "date_published": "2024-03-01"
        }))
        .await
        .unwrap();

        let markup = &result["markup"];
        assert_eq!(markup["@type"], "Article");
        assert_eq!(markup["headline"], "How to flip a website");
        assert_eq!(markup["author"]["name"], "Ada");
        assert_eq!(markup["datePublished"], "2024-03-01");
    }

    #[tokio::test]
    async fn test_faq_markup() {
        let result = run(json!({
            "schema_type": "faq",
            "questions": [
                {"question": "What is it?", "answer": "A thing."},
                {"question": "Why?", "answer": "Because."}
            ]
        }))
        .await
        .unwrap();

        let markup = &result["markup"];
        assert_eq!(markup["@type"], "FAQPage");
        assert_eq!(markup["mainEntity"].as_array().unwrap().len(), 2);
        assert_eq!(markup["mainEntity"][0]["name"], "What is it?");
    }

    #[tokio::test]
    async fn test_empty_faq_rejected() {
        let err = run(json!({"schema_type": "faq", "questions": []}))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unknown_schema_type_rejected() {
        let err = run(json!({"schema_type": "recipe", "headline": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::InvalidInput(_)));
    }
}
