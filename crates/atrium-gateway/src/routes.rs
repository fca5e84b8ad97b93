//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, proxy, root};
use crate::state::GatewayState;

/// Aggregated health path.
pub const HEALTH_PATH: &str = "/internal/health";

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Reserved
/// - `GET /` - Gateway metadata
/// - `GET /internal/health` - Aggregated health document
///
/// ## Proxied (any method)
/// - `/v{n}/{service}/*` - Versioned scheme
/// - `/{service}/*` - Legacy scheme
///
/// Anything else answers 404 with the list of valid services.
pub fn create_router(state: GatewayState) -> Router {
    // Extract config values before moving state
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);

    Router::new()
        // Reserved gateway paths, matched before the proxy fallback
        .route("/", get(root::gateway_info))
        .route(HEALTH_PATH, get(health::health_status))
        // Everything else is resolved and forwarded
        .fallback(proxy::proxy_request)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // The configured limit replaces the 2 MiB default on `Bytes`
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
