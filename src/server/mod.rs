//! Diagnosis HTTP Server
//!
//! Thin axum layer over `Diagnoser`. Provides endpoints for health, label
//! and locale listings, and image classification.

pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ApiError;
pub use state::{AppState, SharedState};

use crate::config::AppConfig;
use crate::pipeline::Diagnoser;
use crate::utils::error::Result;

/// Largest accepted upload (bytes)
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Build the router over shared state
pub fn router(state: SharedState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))

        // Catalogs
        .route("/labels", get(routes::catalog::list_labels))
        .route("/locales", get(routes::catalog::list_locales))
        .route("/locales/:locale/strings", get(routes::catalog::locale_strings))

        // Classification
        .route("/classify", post(routes::classify::classify))

        // Add state
        .with_state(state)

        // Add middleware
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Serve until Ctrl-C
pub async fn run(config: &AppConfig, diagnoser: Diagnoser) -> Result<()> {
    let state = Arc::new(AppState::new(diagnoser, config));
    let app = router(state);

    let addr = config.server.bind_address();
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
