//! Capability execution endpoint: the single dispatch entry point.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use dispatch_common::{DispatchFailureKind, ExecuteResult};

use crate::state::AppState;

/// Build the execute router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/execute", post(execute))
}

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    capability: String,
    #[serde(default)]
    input: Value,
    /// Optional per-attempt deadline override, in milliseconds.
    #[serde(default)]
    timeout_ms: Option<u64>,
}

/// POST /v1/execute - resolve and run a capability request.
///
/// Always returns the normalized `ExecuteResult` shape; dispatch
/// failures map to an HTTP status but never to an opaque error body.
async fn execute(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExecuteRequest>,
) -> (StatusCode, Json<ExecuteResult>) {
    // Entry points call initialize defensively; it is idempotent.
    if let Err(e) = state.engine.initialize().await {
        tracing::error!(error = %e, "Engine initialization failed");
    }

    let request_id = Uuid::new_v4();
    tracing::info!(
        request_id = %request_id,
        capability = %request.capability,
        "Dispatching capability request"
    );

    let deadline = request.timeout_ms.map(Duration::from_millis);
    let result = state
        .engine
        .execute_with_deadline(&request.capability, &request.input, deadline)
        .await;

    let status = match result.failure_kind() {
        None => StatusCode::OK,
        Some(DispatchFailureKind::CapabilityUnknown) => StatusCode::NOT_FOUND,
        Some(DispatchFailureKind::ConfigurationMissing) => StatusCode::SERVICE_UNAVAILABLE,
        Some(DispatchFailureKind::AllHandlersExhausted) => StatusCode::BAD_GATEWAY,
        // Per-handler failures never surface as the final result.
        Some(DispatchFailureKind::HandlerExecutionFailed) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(result))
}
