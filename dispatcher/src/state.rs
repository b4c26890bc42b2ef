//! Shared application state.

use crate::engine::Engine;

/// Shared application state passed to all routes.
pub struct AppState {
    pub engine: Engine,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}
