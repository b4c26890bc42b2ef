//! The dispatch engine: capability resolution and execution with
//! fallback.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::OnceCell;

use dispatch_common::{
    AttemptFailure, CapabilityCatalog, ConfigSource, DispatchFailure, DispatchFailureKind,
    ExecuteResult, HandlerSource,
};

use super::{ExecuteContext, Handler, HandlerQuery, HandlerRegistry};
use crate::error::{Error, Result};
use crate::provider::ConfigProvider;

/// Read-only operational metrics for the engine.
#[derive(Debug, Clone, Serialize)]
pub struct EngineDiagnostics {
    /// Distinct handler ids currently registered.
    pub total_handlers: usize,
    /// Which ConfigProvider variant is active.
    pub config_source: ConfigSource,
}

/// The process-wide dispatch coordinator.
///
/// Constructed explicitly once at process start and injected into every
/// caller; there is no hidden global. `initialize` is idempotent so
/// both the server entry point and any embedded caller can invoke it
/// defensively.
pub struct Engine {
    catalog: CapabilityCatalog,
    registry: Arc<HandlerRegistry>,
    config: Arc<dyn ConfigProvider>,
    attempt_timeout: Duration,
    /// Handlers registered on first `initialize` call.
    pending: Vec<Arc<dyn Handler>>,
    initialized: OnceCell<()>,
}

impl Engine {
    pub fn new(
        catalog: CapabilityCatalog,
        config: Arc<dyn ConfigProvider>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            registry: Arc::new(HandlerRegistry::new()),
            config,
            attempt_timeout,
            pending: Vec::new(),
            initialized: OnceCell::new(),
        }
    }

    /// Supply the handlers `initialize` will register.
    pub fn with_handlers(mut self, handlers: Vec<Arc<dyn Handler>>) -> Self {
        self.pending = handlers;
        self
    }

    /// Register all known handlers. Idempotent: repeated calls perform
    /// no additional registration or side effects.
    pub async fn initialize(&self) -> Result<()> {
        self.initialized
            .get_or_try_init(|| async {
                for handler in &self.pending {
                    self.register(handler.clone()).await?;
                }
                tracing::info!(
                    handlers = self.registry.total_handlers(),
                    capabilities = self.catalog.len(),
                    "Dispatch engine initialized"
                );
                Ok(())
            })
            .await
            .map(|_| ())
    }

    /// Register a single handler, validating its declared capabilities
    /// against the catalog.
    pub async fn register(&self, handler: Arc<dyn Handler>) -> Result<()> {
        let descriptor = handler.descriptor();
        for capability_id in &descriptor.capabilities {
            if !self.catalog.contains(capability_id) {
                return Err(Error::UnknownCapability {
                    handler_id: descriptor.id.clone(),
                    capability_id: capability_id.clone(),
                });
            }
        }
        tracing::info!(
            handler = %descriptor.id,
            source = %descriptor.source,
            priority = descriptor.priority,
            "Registering handler"
        );
        self.registry.register(handler).await;
        Ok(())
    }

    /// Resolve and execute a capability request with the default
    /// per-attempt deadline.
    pub async fn execute(&self, capability_id: &str, input: &Value) -> ExecuteResult {
        self.execute_with_deadline(capability_id, input, None).await
    }

    /// Resolve and execute a capability request.
    ///
    /// Candidates are tried strictly sequentially in priority order; a
    /// new attempt never starts before the current one has settled. The
    /// engine enforces `deadline` (or the configured default) as a hard
    /// timeout on each attempt.
    pub async fn execute_with_deadline(
        &self,
        capability_id: &str,
        input: &Value,
        deadline: Option<Duration>,
    ) -> ExecuteResult {
        let started = Instant::now();
        let attempt_timeout = deadline.unwrap_or(self.attempt_timeout);

        // Unknown capability fails immediately, without touching the
        // registry.
        let capability = match self.catalog.get(capability_id) {
            Some(capability) => capability,
            None => {
                return ExecuteResult::failed(
                    DispatchFailure {
                        kind: DispatchFailureKind::CapabilityUnknown,
                        message: format!("unknown capability '{}'", capability_id),
                        attempts: vec![],
                    },
                    elapsed_ms(started),
                );
            }
        };

        if !capability.is_enabled {
            return ExecuteResult::failed(
                DispatchFailure {
                    kind: DispatchFailureKind::ConfigurationMissing,
                    message: format!(
                        "capability '{}' is disabled in this deployment",
                        capability_id
                    ),
                    attempts: vec![],
                },
                elapsed_ms(started),
            );
        }

        // Availability is evaluated fresh against the active config
        // provider; the result comes back already priority-sorted.
        let candidates = self
            .registry
            .query(
                &HandlerQuery::capability(capability_id).available(),
                self.config.as_ref(),
            )
            .await;

        if candidates.is_empty() {
            let guidance = self.configuration_guidance(capability_id).await;
            return ExecuteResult::failed(
                DispatchFailure {
                    kind: DispatchFailureKind::ConfigurationMissing,
                    message: guidance,
                    attempts: vec![],
                },
                elapsed_ms(started),
            );
        }

        let ctx = ExecuteContext {
            config: self.config.as_ref(),
            deadline: attempt_timeout,
        };

        let mut attempts: Vec<AttemptFailure> = Vec::new();
        let mut last_attempted: Option<(String, HandlerSource)> = None;

        for handler in candidates {
            let descriptor = handler.descriptor();
            last_attempted = Some((descriptor.id.clone(), descriptor.source));

            let outcome = tokio::time::timeout(attempt_timeout, handler.execute(input, &ctx)).await;
            match outcome {
                Ok(Ok(data)) => {
                    tracing::debug!(
                        capability = %capability_id,
                        handler = %descriptor.id,
                        failed_attempts = attempts.len(),
                        "Dispatch succeeded"
                    );
                    return ExecuteResult::ok(
                        data,
                        &descriptor.id,
                        descriptor.source,
                        elapsed_ms(started),
                    );
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        capability = %capability_id,
                        handler = %descriptor.id,
                        error = %e,
                        "Handler attempt failed, falling back"
                    );
                    attempts.push(AttemptFailure {
                        handler_id: descriptor.id.clone(),
                        error: e.to_string(),
                    });
                }
                Err(_) => {
                    tracing::warn!(
                        capability = %capability_id,
                        handler = %descriptor.id,
                        timeout_ms = attempt_timeout.as_millis() as u64,
                        "Handler attempt timed out, falling back"
                    );
                    attempts.push(AttemptFailure {
                        handler_id: descriptor.id.clone(),
                        error: format!("timed out after {}ms", attempt_timeout.as_millis()),
                    });
                }
            }
        }

        let (last_handler, last_source) =
            last_attempted.expect("at least one candidate was attempted");
        let mut result = ExecuteResult::failed(
            DispatchFailure {
                kind: DispatchFailureKind::AllHandlersExhausted,
                message: format!(
                    "all {} available handler(s) failed for capability '{}'",
                    attempts.len(),
                    capability_id
                ),
                attempts,
            },
            elapsed_ms(started),
        );
        result.handler_used = Some(last_handler);
        result.source = Some(last_source);
        result
    }

    /// Actionable guidance for a ConfigurationMissing failure.
    async fn configuration_guidance(&self, capability_id: &str) -> String {
        let registered = self
            .registry
            .query(&HandlerQuery::capability(capability_id), self.config.as_ref())
            .await;

        if registered.is_empty() {
            return format!("no handlers are registered for capability '{}'", capability_id);
        }

        let providers: Vec<String> = registered
            .iter()
            .filter_map(|h| h.descriptor().provider_id.clone())
            .collect();
        if providers.is_empty() {
            format!(
                "all handlers for capability '{}' are currently disabled",
                capability_id
            )
        } else {
            format!(
                "no available handlers for capability '{}'; configure credentials for: {}",
                capability_id,
                providers.join(", ")
            )
        }
    }

    /// Operational metrics: registration-time handler count plus the
    /// active config source.
    pub fn diagnostics(&self) -> EngineDiagnostics {
        EngineDiagnostics {
            total_handlers: self.registry.total_handlers(),
            config_source: self.config.source(),
        }
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &Arc<dyn ConfigProvider> {
        &self.config
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
