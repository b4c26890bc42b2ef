//! Normalized dispatch results and the dispatch failure taxonomy.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::handler::HandlerSource;

/// Classification of a failed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchFailureKind {
    /// The requested capability id is not in the catalog.
    CapabilityUnknown,
    /// The capability is known but no handler is currently available.
    ConfigurationMissing,
    /// A specific handler attempt failed. Absorbed by the fallback
    /// loop; never the final result on its own.
    HandlerExecutionFailed,
    /// Every available candidate failed.
    AllHandlersExhausted,
}

/// One failed handler attempt, recorded during fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptFailure {
    pub handler_id: String,
    pub error: String,
}

/// The failure payload of an [`ExecuteResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchFailure {
    pub kind: DispatchFailureKind,
    /// Human-readable message with actionable guidance where possible.
    pub message: String,
    /// Per-handler failures accumulated before giving up.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<AttemptFailure>,
}

/// Normalized outcome of a capability dispatch.
///
/// Callers always receive this shape, success or failure; handler
/// failures never propagate as panics or raw errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DispatchFailure>,
    /// Id of the handler that produced the outcome. For failures, the
    /// last handler attempted, if any was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<HandlerSource>,
    /// Wall-clock duration of the dispatch in milliseconds.
    pub latency_ms: u64,
}

impl ExecuteResult {
    pub fn ok(data: Value, handler_id: &str, source: HandlerSource, latency_ms: u64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            handler_used: Some(handler_id.to_string()),
            source: Some(source),
            latency_ms,
        }
    }

    pub fn failed(failure: DispatchFailure, latency_ms: u64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(failure),
            handler_used: None,
            source: None,
            latency_ms,
        }
    }

    pub fn failure_kind(&self) -> Option<DispatchFailureKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}
