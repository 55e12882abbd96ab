//! HTTP API serving directives to the actuator.
//!
//! Provides GET endpoints:
//! - `/` and `/directive`: run the operation named by `?func=`
//! - `/curve`: colors for every wind-speed bucket
//! - `/health`: liveness

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::service::DirectiveService;

/// Immutable application state shared across all request handlers.
///
/// Built once at startup and wrapped in `Arc`; no locks needed since the
/// service holds only read-only data and a channel sender.
pub struct AppState {
    /// Operation dispatcher.
    pub service: DirectiveService,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::get_directive))
        .route("/directive", get(handlers::get_directive))
        .route("/curve", get(handlers::get_curve))
        .route("/health", get(handlers::get_health))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
