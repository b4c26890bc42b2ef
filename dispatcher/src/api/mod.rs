//! HTTP API for the dispatcher.

pub mod diagnostics;
pub mod execute;
pub mod health;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Build the versioned API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(execute::router())
        .merge(diagnostics::router())
}
