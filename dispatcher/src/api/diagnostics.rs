//! Diagnostics endpoint: registry and configuration state.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use dispatch_common::HandlerSource;

use crate::engine::EngineDiagnostics;
use crate::state::AppState;

/// Build the diagnostics router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/diagnostics", get(diagnostics))
}

#[derive(Debug, Serialize)]
struct DiagnosticsResponse {
    generated_at: DateTime<Utc>,
    capabilities: Vec<CapabilityDiagnostics>,
    enabled_capabilities: usize,
    available_handlers: usize,
    engine: EngineDiagnostics,
}

#[derive(Debug, Serialize)]
struct CapabilityDiagnostics {
    id: String,
    name: String,
    is_enabled: bool,
    handlers: Vec<HandlerDiagnostics>,
}

#[derive(Debug, Serialize)]
struct HandlerDiagnostics {
    id: String,
    name: String,
    source: HandlerSource,
    is_available: bool,
}

/// GET /v1/diagnostics - capabilities with their handlers, counts, and
/// engine state. Availability is evaluated live per handler.
async fn diagnostics(State(state): State<Arc<AppState>>) -> Json<DiagnosticsResponse> {
    if let Err(e) = state.engine.initialize().await {
        tracing::error!(error = %e, "Engine initialization failed");
    }

    let engine = &state.engine;
    let config = engine.config().as_ref();
    let handlers = engine.registry().list().await;

    let mut available_handlers = 0;
    let availability: Vec<bool> = handlers
        .iter()
        .map(|h| {
            let available = h.check_availability(config);
            if available {
                available_handlers += 1;
            }
            available
        })
        .collect();

    let capabilities: Vec<CapabilityDiagnostics> = engine
        .catalog()
        .all()
        .iter()
        .map(|capability| CapabilityDiagnostics {
            id: capability.id.clone(),
            name: capability.name.clone(),
            is_enabled: capability.is_enabled,
            handlers: handlers
                .iter()
                .zip(availability.iter())
                .filter(|(h, _)| h.descriptor().serves(&capability.id))
                .map(|(h, available)| HandlerDiagnostics {
                    id: h.descriptor().id.clone(),
                    name: h.descriptor().name.clone(),
                    source: h.descriptor().source,
                    is_available: *available,
                })
                .collect(),
        })
        .collect();

    Json(DiagnosticsResponse {
        generated_at: Utc::now(),
        enabled_capabilities: engine.catalog().enabled_count(),
        available_handlers,
        capabilities,
        engine: engine.diagnostics(),
    })
}
