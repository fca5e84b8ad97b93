//! Request forwarding.
//!
//! The [`Forwarder`] turns an inbound request into an equivalent call against
//! the resolved service and relays the answer. Downstream error statuses are
//! relayed as-is; only transport failures become [`ProxyError`]s.

use std::sync::Arc;
use std::time::Duration;

use atrium_core::{ResolvedTarget, ServiceId, ServiceRegistry};
use axum::body::Bytes;
use axum::http::header::{
    CONNECTION, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, HOST, TRANSFER_ENCODING,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, warn};

/// Response headers never relayed back to the caller.
pub static EXCLUDED_RESPONSE_HEADERS: [HeaderName; 3] =
    [CONTENT_ENCODING, TRANSFER_ENCODING, CONNECTION];

/// Inbound framing headers the HTTP client recomputes for the outbound call.
static FRAMING_REQUEST_HEADERS: [HeaderName; 3] = [HOST, CONTENT_LENGTH, TRANSFER_ENCODING];

/// Errors raised when a call cannot complete.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Connection refused, DNS failure, timeout, or a broken response body.
    #[error("failed to reach {service}: {reason}")]
    Network {
        /// Target service.
        service: ServiceId,
        /// Transport error message.
        reason: String,
    },
}

/// An inbound request to forward.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    /// HTTP method.
    pub method: Method,
    /// Inbound headers.
    pub headers: HeaderMap,
    /// Request body, if any.
    pub body: Option<Bytes>,
}

/// A downstream response to relay.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    /// Downstream status code.
    pub status: StatusCode,
    /// Downstream headers minus [`EXCLUDED_RESPONSE_HEADERS`].
    pub headers: HeaderMap,
    /// Downstream body bytes.
    pub body: Bytes,
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        *response.headers_mut() = self.headers;
        response
    }
}

/// Forwards requests to backend services.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    registry: Arc<ServiceRegistry>,
}

impl Forwarder {
    /// Create a forwarder with a per-call timeout and redirect limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        registry: Arc<ServiceRegistry>,
        timeout: Duration,
        max_redirects: usize,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(max_redirects))
            .build()?;

        Ok(Self::with_client(client, registry))
    }

    /// Create a forwarder with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, registry: Arc<ServiceRegistry>) -> Self {
        Self { client, registry }
    }

    /// Get the service registry.
    #[must_use]
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Forward a request to its resolved target.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Network`] if the call cannot complete. A
    /// downstream error status is not an error here.
    pub async fn forward(
        &self,
        target: &ResolvedTarget,
        request: ProxyRequest,
    ) -> Result<ProxyResponse, ProxyError> {
        let url = format!(
            "{}{}",
            self.registry.base_url(target.service),
            target.path_and_query()
        );
        let network = |e: reqwest::Error| ProxyError::Network {
            service: target.service,
            reason: e.to_string(),
        };

        debug!(
            service = %target.service,
            method = %request.method,
            url = %url,
            "Forwarding request"
        );

        let mut outbound = self
            .client
            .request(request.method.clone(), &url)
            .headers(outbound_headers(request.headers));
        if carries_body(&request.method) {
            if let Some(body) = request.body {
                outbound = outbound.body(body);
            }
        }

        let response = outbound.send().await.map_err(|e| {
            warn!(service = %target.service, url = %url, error = %e, "Forward failed");
            network(e)
        })?;

        let status = response.status();
        let headers = relay_headers(response.headers());
        let body = response.bytes().await.map_err(|e| {
            warn!(service = %target.service, url = %url, error = %e, "Reading response failed");
            network(e)
        })?;

        debug!(
            service = %target.service,
            status = %status,
            bytes = body.len(),
            "Relaying response"
        );

        Ok(ProxyResponse {
            status,
            headers,
            body,
        })
    }
}

/// Whether a request body is forwarded for this method.
#[must_use]
pub fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Inbound headers as sent downstream, with `Content-Type` set to JSON.
#[must_use]
pub fn outbound_headers(mut headers: HeaderMap) -> HeaderMap {
    for name in &FRAMING_REQUEST_HEADERS {
        headers.remove(name);
    }
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Downstream headers as relayed to the caller.
///
/// Header names are case-insensitive, so the exclusion covers every casing.
/// Repeated headers keep all their values.
#[must_use]
pub fn relay_headers(headers: &HeaderMap) -> HeaderMap {
    let mut relayed = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !EXCLUDED_RESPONSE_HEADERS.contains(name) {
            relayed.append(name.clone(), value.clone());
        }
    }
    relayed
}
