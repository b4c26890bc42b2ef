//! Capability dispatcher - resolves capability requests to handlers
//! with priority-ordered fallback.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dispatcher::config::Config;
use dispatcher::engine::Engine;
use dispatcher::handlers;
use dispatcher::logging::request_logger;
use dispatcher::state::AppState;
use dispatcher::api;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Make sure config.toml is valid or use DISPATCHER__SECTION__KEY environment variables.",
            e
        )
    })?;
    tracing::info!(version = VERSION, "Starting capability-dispatcher");

    // Choose the config provider once for this process.
    let provider = config.config_provider();
    tracing::info!(config_source = %provider.source(), "Selected configuration source");

    // Construct the one engine for this process and initialize it.
    let engine = Engine::new(
        handlers::builtin_catalog(),
        provider,
        config.dispatch.attempt_timeout(),
    )
    .with_handlers(handlers::builtin_handlers(&config));
    engine.initialize().await?;

    let state = Arc::new(AppState::new(engine));

    // Build router
    let app = Router::new()
        .nest("/v1", api::router())
        .route("/health", axum::routing::get(api::health::health))
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(request_logger))
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", config.api.host, config.api.port);
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
