//! Capability dispatch engine.
//!
//! This module defines the [`Handler`] trait that feature modules
//! implement to participate in dispatch, the [`HandlerRegistry`] that
//! catalogs them, and the [`Engine`] that resolves a capability request
//! to a handler with priority-ordered fallback.

mod dispatch;
mod registry;

pub use dispatch::{Engine, EngineDiagnostics};
pub use registry::{HandlerQuery, HandlerRegistry};

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use dispatch_common::HandlerDescriptor;

use crate::provider::ConfigProvider;

/// Error from a single handler attempt.
///
/// Absorbed by the engine's fallback loop; only surfaces to callers as
/// part of an all-handlers-exhausted aggregate.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("provider request failed: {0}")]
    Provider(String),

    #[error("handler failed: {0}")]
    Failed(String),
}

pub type HandlerResult = std::result::Result<Value, HandlerError>;

/// Per-attempt context passed to a handler.
pub struct ExecuteContext<'a> {
    /// Active credential/settings source.
    pub config: &'a dyn ConfigProvider,
    /// Budget for this attempt. The engine also enforces it as a hard
    /// timeout, so a handler that ignores it is still cut off.
    pub deadline: Duration,
}

/// A concrete implementation able to service one or more capabilities.
///
/// Handlers are supplied by feature areas and registered with the
/// engine; the core depends only on this contract.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Identity and routing metadata. Stable for the handler's
    /// lifetime; one canonical handler exists per id.
    fn descriptor(&self) -> &HandlerDescriptor;

    /// Whether the handler's prerequisites (credentials, settings) are
    /// currently satisfied. Evaluated fresh on every dispatch, never
    /// cached: credentials can change without a restart.
    fn check_availability(&self, config: &dyn ConfigProvider) -> bool;

    /// Service one request.
    async fn execute(&self, input: &Value, ctx: &ExecuteContext<'_>) -> HandlerResult;
}
