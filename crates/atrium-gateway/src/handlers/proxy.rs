//! Proxy fallback handler.
//!
//! Every path that is not a reserved gateway route lands here, is resolved
//! to a backend service, and is forwarded.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};

use atrium_core::resolve;

use crate::error::{ApiError, ErrorReply};
use crate::proxy::{ProxyRequest, ProxyResponse};
use crate::state::GatewayState;

/// Resolve the request path and forward the request.
///
/// # Errors
///
/// Returns 404 if no service matches the path and 502 if the service cannot
/// be reached. Downstream error statuses are relayed, not mapped.
pub async fn proxy_request(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ProxyResponse, ErrorReply> {
    let path = uri.path();

    let Ok(target) = resolve(path, uri.query()) else {
        tracing::debug!(method = %method, path = %path, "No service matches path");
        return Err(ApiError::RouteNotFound(path.to_string()).at(path));
    };

    let request = ProxyRequest {
        method,
        headers,
        body: (!body.is_empty()).then_some(body),
    };

    state
        .forwarder
        .forward(&target, request)
        .await
        .map_err(|e| ApiError::from(e).at(path))
}
