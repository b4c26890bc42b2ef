//! Handler registry: the in-memory catalog of registered handlers.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use dispatch_common::HandlerSource;

use super::Handler;
use crate::provider::ConfigProvider;

struct Entry {
    /// Registration order, used as the priority tie-break. A handler
    /// keeps its original position when re-registered.
    seq: u64,
    handler: Arc<dyn Handler>,
}

/// Filter for [`HandlerRegistry::query`].
pub struct HandlerQuery<'a> {
    /// Capability the candidates must serve.
    pub capability: &'a str,
    /// Restrict to one handler source, if set.
    pub source: Option<HandlerSource>,
    /// Drop candidates whose availability check fails.
    pub only_available: bool,
}

impl<'a> HandlerQuery<'a> {
    pub fn capability(capability: &'a str) -> Self {
        Self {
            capability,
            source: None,
            only_available: false,
        }
    }

    pub fn available(mut self) -> Self {
        self.only_available = true;
        self
    }

    pub fn from_source(mut self, source: HandlerSource) -> Self {
        self.source = Some(source);
        self
    }
}

/// Registry of all handlers participating in dispatch.
///
/// Read-mostly after startup. Registration takes the write lock, so a
/// concurrent query never observes a partially applied registration.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: RwLock<Vec<Entry>>,
    next_seq: AtomicU64,
    /// Distinct registered ids, maintained at registration time so
    /// diagnostics never need the lock.
    total: AtomicUsize,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Re-registering an existing id replaces the
    /// previous handler; duplicates never coexist.
    pub async fn register(&self, handler: Arc<dyn Handler>) {
        let id = handler.descriptor().id.clone();
        let mut entries = self.entries.write().await;
        if let Some(existing) = entries
            .iter_mut()
            .find(|e| e.handler.descriptor().id == id)
        {
            tracing::debug!(handler = %id, "Replacing registered handler");
            existing.handler = handler;
        } else {
            entries.push(Entry {
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                handler,
            });
        }
        self.total.store(entries.len(), Ordering::Relaxed);
    }

    /// Candidates for a capability, sorted by priority descending with
    /// earlier registration winning ties.
    ///
    /// Availability checks run against a snapshot, outside the lock.
    pub async fn query(
        &self,
        query: &HandlerQuery<'_>,
        config: &dyn ConfigProvider,
    ) -> Vec<Arc<dyn Handler>> {
        let mut candidates: Vec<(u64, Arc<dyn Handler>)> = {
            let entries = self.entries.read().await;
            entries
                .iter()
                .filter(|e| e.handler.descriptor().serves(query.capability))
                .filter(|e| {
                    query
                        .source
                        .map_or(true, |s| e.handler.descriptor().source == s)
                })
                .map(|e| (e.seq, e.handler.clone()))
                .collect()
        };

        if query.only_available {
            candidates.retain(|(_, h)| h.check_availability(config));
        }

        candidates.sort_by(|(seq_a, a), (seq_b, b)| {
            b.descriptor()
                .priority
                .cmp(&a.descriptor().priority)
                .then(seq_a.cmp(seq_b))
        });

        candidates.into_iter().map(|(_, h)| h).collect()
    }

    /// All registered handlers, in registration order.
    pub async fn list(&self) -> Vec<Arc<dyn Handler>> {
        let entries = self.entries.read().await;
        entries.iter().map(|e| e.handler.clone()).collect()
    }

    /// Distinct capability ids declared across registered handlers.
    pub async fn list_capabilities(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut capabilities: Vec<String> = Vec::new();
        for entry in entries.iter() {
            for capability in &entry.handler.descriptor().capabilities {
                if !capabilities.contains(capability) {
                    capabilities.push(capability.clone());
                }
            }
        }
        capabilities
    }

    /// Count of distinct registered handler ids.
    pub fn total_handlers(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ExecuteContext, HandlerResult};
    use crate::provider::EnvConfigProvider;
    use async_trait::async_trait;
    use dispatch_common::HandlerDescriptor;
    use serde_json::{json, Value};

    struct FakeHandler {
        descriptor: HandlerDescriptor,
        available: bool,
    }

    impl FakeHandler {
        fn new(id: &str, capability: &str, priority: i32) -> Arc<Self> {
            Self::with_availability(id, capability, priority, true)
        }

        fn with_availability(
            id: &str,
            capability: &str,
            priority: i32,
            available: bool,
        ) -> Arc<Self> {
            Arc::new(Self {
                descriptor: HandlerDescriptor {
                    id: id.to_string(),
                    name: id.to_string(),
                    source: HandlerSource::Local,
                    provider_id: None,
                    capabilities: vec![capability.to_string()],
                    priority,
                },
                available,
            })
        }
    }

    #[async_trait]
    impl Handler for FakeHandler {
        fn descriptor(&self) -> &HandlerDescriptor {
            &self.descriptor
        }

        fn check_availability(&self, _config: &dyn crate::provider::ConfigProvider) -> bool {
            self.available
        }

        async fn execute(&self, _input: &Value, _ctx: &ExecuteContext<'_>) -> HandlerResult {
            Ok(json!({}))
        }
    }

    #[tokio::test]
    async fn test_reregistration_replaces() {
        let registry = HandlerRegistry::new();
        registry.register(FakeHandler::new("x", "cap", 10)).await;
        registry.register(FakeHandler::new("x", "cap", 99)).await;

        let handlers = registry.list().await;
        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers[0].descriptor().priority, 99);
        assert_eq!(registry.total_handlers(), 1);
    }

    #[tokio::test]
    async fn test_query_sorts_by_priority_desc() {
        let registry = HandlerRegistry::new();
        registry.register(FakeHandler::new("low", "cap", 5)).await;
        registry.register(FakeHandler::new("high", "cap", 100)).await;
        registry.register(FakeHandler::new("mid", "cap", 50)).await;

        let config = EnvConfigProvider::new();
        let results = registry
            .query(&HandlerQuery::capability("cap"), &config)
            .await;
        let ids: Vec<&str> = results.iter().map(|h| h.descriptor().id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[tokio::test]
    async fn test_query_ties_broken_by_registration_order() {
        let registry = HandlerRegistry::new();
        registry.register(FakeHandler::new("first", "cap", 10)).await;
        registry.register(FakeHandler::new("second", "cap", 10)).await;

        let config = EnvConfigProvider::new();
        let results = registry
            .query(&HandlerQuery::capability("cap"), &config)
            .await;
        let ids: Vec<&str> = results.iter().map(|h| h.descriptor().id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_query_filters_unavailable() {
        let registry = HandlerRegistry::new();
        registry
            .register(FakeHandler::with_availability("up", "cap", 10, true))
            .await;
        registry
            .register(FakeHandler::with_availability("down", "cap", 99, false))
            .await;

        let config = EnvConfigProvider::new();
        let available = registry
            .query(&HandlerQuery::capability("cap").available(), &config)
            .await;
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].descriptor().id, "up");

        // Without the availability filter both come back.
        let all = registry
            .query(&HandlerQuery::capability("cap"), &config)
            .await;
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_query_filters_by_capability() {
        let registry = HandlerRegistry::new();
        registry.register(FakeHandler::new("a", "cap-1", 10)).await;
        registry.register(FakeHandler::new("b", "cap-2", 10)).await;

        let config = EnvConfigProvider::new();
        let results = registry
            .query(&HandlerQuery::capability("cap-1"), &config)
            .await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].descriptor().id, "a");
    }

    #[tokio::test]
    async fn test_query_filters_by_source() {
        let registry = HandlerRegistry::new();
        registry.register(FakeHandler::new("local", "cap", 10)).await;

        let config = EnvConfigProvider::new();
        let local = registry
            .query(
                &HandlerQuery::capability("cap").from_source(HandlerSource::Local),
                &config,
            )
            .await;
        assert_eq!(local.len(), 1);

        let providers = registry
            .query(
                &HandlerQuery::capability("cap").from_source(HandlerSource::AiProvider),
                &config,
            )
            .await;
        assert!(providers.is_empty());
    }

    #[tokio::test]
    async fn test_list_capabilities_distinct() {
        let registry = HandlerRegistry::new();
        registry.register(FakeHandler::new("a", "cap-1", 10)).await;
        registry.register(FakeHandler::new("b", "cap-1", 20)).await;
        registry.register(FakeHandler::new("c", "cap-2", 10)).await;

        let capabilities = registry.list_capabilities().await;
        assert_eq!(capabilities, vec!["cap-1".to_string(), "cap-2".to_string()]);
    }
}
