//! Aggregated health endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use atrium_health::HealthDocument;

use crate::state::GatewayState;

/// Probe every service and infrastructure dependency.
///
/// Always answers 200; the document's `status` field carries the verdict.
pub async fn health_status(State(state): State<Arc<GatewayState>>) -> Json<HealthDocument> {
    Json(state.health.health_status().await)
}
