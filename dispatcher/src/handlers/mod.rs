//! Builtin handler modules and the capability catalog.
//!
//! Each feature area contributes a handler implementing the
//! [`crate::engine::Handler`] contract. The dispatch core never depends
//! on the internals here, only on the contract.

pub mod author_match;
pub mod content_quality;
pub mod internal_links;
pub mod openai_compat;
pub mod schema_markup;

use std::sync::Arc;

use dispatch_common::{Capability, CapabilityCatalog};

use crate::config::Config;
use crate::engine::Handler;

fn capability(id: &str, name: &str, description: &str, icon: &str) -> Capability {
    Capability {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        is_enabled: true,
    }
}

/// The static per-process capability catalog.
pub fn builtin_catalog() -> CapabilityCatalog {
    CapabilityCatalog::new(vec![
        capability(
            "text:generate",
            "Text generation",
            "Generate article or marketing copy from a prompt",
            "✍",
        ),
        capability(
            "research:deep",
            "Deep research",
            "Research a topic with source-backed findings",
            "🔎",
        ),
        capability(
            "content:quality",
            "Content quality score",
            "Score draft content for readability and structure",
            "✓",
        ),
        capability(
            "schema:markup",
            "Schema markup",
            "Generate JSON-LD structured data for a page",
            "{}",
        ),
        capability(
            "links:internal",
            "Internal link suggestions",
            "Suggest internal links between a draft and existing pages",
            "⇄",
        ),
        capability(
            "author:match",
            "Author matching",
            "Pick the best-fitting author profile for a topic",
            "@",
        ),
    ])
}

/// All builtin handlers, in registration order.
///
/// Provider-backed handlers are registered once per provider id; their
/// enabled state comes from configuration at dispatch time, not from
/// competing stub registrations.
pub fn builtin_handlers(config: &Config) -> Vec<Arc<dyn Handler>> {
    vec![
        Arc::new(openai_compat::OpenAiCompatHandler::text_generation(
            &config.providers.openai,
        )),
        Arc::new(openai_compat::OpenAiCompatHandler::research(
            &config.providers.perplexity,
        )),
        Arc::new(content_quality::ContentQualityHandler::new()),
        Arc::new(schema_markup::SchemaMarkupHandler::new()),
        Arc::new(internal_links::InternalLinksHandler::new()),
        Arc::new(author_match::AuthorMatchHandler::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.len(), 6);
        assert!(catalog.contains("text:generate"));
        assert!(catalog.contains("author:match"));
    }

    #[test]
    fn test_builtin_handlers_declare_catalog_capabilities() {
        let catalog = builtin_catalog();
        let handlers = builtin_handlers(&test_config());
        for handler in handlers {
            for capability_id in &handler.descriptor().capabilities {
                assert!(
                    catalog.contains(capability_id),
                    "handler {} declares unknown capability {}",
                    handler.descriptor().id,
                    capability_id
                );
            }
        }
    }

    #[test]
    fn test_builtin_handler_ids_are_unique() {
        let handlers = builtin_handlers(&test_config());
        let mut ids: Vec<String> = handlers
            .iter()
            .map(|h| h.descriptor().id.clone())
            .collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    fn test_config() -> Config {
        serde_json::from_str("{}").unwrap()
    }
}
