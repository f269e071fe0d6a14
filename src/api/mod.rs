//! HTTP API for profile uploads and dispatch simulation.
//!
//! - `GET /` liveness
//! - `POST /api/v1/upload` single CSV profile
//! - `POST /api/v1/upload-multiple` several CSV profiles
//! - `POST /api/v1/simulate` run the dispatch engine
//!
//! Handlers share no mutable state; every simulation builds its own battery
//! and accumulator.

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use types::{
    ApiError, ErrorResponse, MultipleProfilesResponse, SimulationResponse, StatusResponse,
};

use crate::config::ServerConfig;

/// Immutable application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Frontend origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Upper bound on a request body (bytes).
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(server: &ServerConfig) -> Self {
        Self {
            cors_origins: server.cors_origins.clone(),
            max_upload_bytes: server.max_upload_bytes,
        }
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/v1/upload", post(handlers::upload))
        .route("/api/v1/upload-multiple", post(handlers::upload_multiple))
        .route("/api/v1/simulate", post(handlers::simulate_request))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors_layer(&state.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured frontend origins, with credentials and any
/// method or header the browser asks for.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "skipping invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
