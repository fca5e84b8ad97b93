//! Gateway metadata endpoint.

use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use atrium_core::ServiceId;

use crate::routes::HEALTH_PATH;

/// Gateway metadata response.
#[derive(Debug, Serialize)]
pub struct GatewayInfo {
    /// Gateway name.
    pub name: &'static str,
    /// Gateway version.
    pub version: &'static str,
    /// Valid service prefixes.
    pub services: [&'static str; 6],
    /// Accepted path schemes.
    pub routes: RouteSchemes,
    /// Aggregated health path.
    pub health: &'static str,
}

/// Path schemes accepted for proxied requests.
#[derive(Debug, Serialize)]
pub struct RouteSchemes {
    /// Versioned scheme.
    pub versioned: &'static str,
    /// Legacy scheme.
    pub legacy: &'static str,
}

/// Describe the gateway.
///
/// # Example
///
/// ```text
/// GET /
///
/// Response: 200 OK
/// {
///   "name": "atrium-gateway",
///   "version": "0.1.0",
///   "services": ["identity", "course", "media", "progress", "reviews", "indexer"],
///   "routes": { "versioned": "/v{n}/{service}/*", "legacy": "/{service}/*" },
///   "health": "/internal/health"
/// }
/// ```
pub async fn gateway_info() -> impl IntoResponse {
    Json(GatewayInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        services: ServiceId::names(),
        routes: RouteSchemes {
            versioned: "/v{n}/{service}/*",
            legacy: "/{service}/*",
        },
        health: HEALTH_PATH,
    })
}
