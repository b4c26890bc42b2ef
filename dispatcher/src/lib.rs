//! Capability dispatcher service.
//!
//! Resolves abstract capability requests (generate text, score content
//! quality, ...) to one of several competing handlers - local
//! computation, feature integrations, or proxies to external AI
//! providers - selecting by priority and live availability, with
//! sequential fallback on failure.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod provider;
pub mod state;

pub use config::Config;
pub use engine::{Engine, EngineDiagnostics, ExecuteContext, Handler, HandlerRegistry};
pub use provider::{ConfigProvider, EnvConfigProvider, StoredConfigProvider};
pub use state::AppState;
