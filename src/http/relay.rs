//! The relay: rewrite one admitted request against the upstream origin,
//! forward it, and return the buffered response.
//!
//! # Responsibilities
//! - Strip the `/api` prefix and build the upstream target URL
//! - Buffer payload-bearing request bodies so `Content-Length` is definite
//! - Construct the constrained upstream header set (JSON content types,
//!   upstream `Host`, configured upstream-presented `Origin`)
//! - Buffer the upstream response and copy it back, minus `Transfer-Encoding`
//! - Convert every failure into one structured JSON error response
//!
//! # Design Decisions
//! - Buffer-and-forward, not streaming pass-through: the exchange with the
//!   caller completes only once the whole upstream body has arrived
//! - Exactly one upstream attempt per inbound request, no retries
//! - Caller headers are not passed through; the upstream sees only the
//!   constrained header set above

use std::time::Instant;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use url::Url;

use crate::config::UpstreamConfig;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Inbound path prefix that marks a request for relaying.
pub const RELAY_PREFIX: &str = "/api";

/// Per-process view of the fixed upstream origin, parsed once at startup.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    base: Url,
    host: HeaderValue,
    origin: HeaderValue,
}

/// Errors building the upstream target from configuration. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamTargetError {
    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),
    #[error("upstream url has no host")]
    MissingHost,
    #[error("invalid header value: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderValue),
}

impl UpstreamTarget {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamTargetError> {
        let base = Url::parse(&config.url)?;
        let host = match (base.host_str(), base.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(UpstreamTargetError::MissingHost),
        };
        Ok(Self {
            host: HeaderValue::from_str(&host)?,
            origin: HeaderValue::from_str(&config.origin_header)?,
            base,
        })
    }

    /// Rewrite an inbound URI into the full upstream URL: strip the relay
    /// prefix, keep the query string, and treat an empty remainder as `/`.
    pub fn url_for(&self, uri: &Uri) -> Url {
        let path = uri.path();
        let stripped = path.strip_prefix(RELAY_PREFIX).unwrap_or(path);
        let mut url = self.base.clone();
        url.set_path(if stripped.is_empty() { "/" } else { stripped });
        url.set_query(uri.query());
        url
    }

    /// Host header value for upstream requests (host, plus port when
    /// non-default for the scheme).
    pub fn host_header(&self) -> &HeaderValue {
        &self.host
    }

    /// The `Origin` value presented to the upstream.
    pub fn origin_header(&self) -> &HeaderValue {
        &self.origin
    }
}

/// A failure anywhere between request assembly and upstream response receipt.
///
/// All variants surface to the caller through [`relay_failure`]; none of them
/// are fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("failed to read request body: {0}")]
    BodyRead(axum::Error),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("failed to assemble response: {0}")]
    Assemble(#[from] axum::http::Error),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        relay_failure(&self)
    }
}

/// The single client-facing error shape for relay failures.
///
/// Every failure path funnels through here so callers always see the same
/// structure: a 500 with `error`, `message`, and `details` keys.
fn relay_failure(error: &RelayError) -> Response {
    tracing::error!(%error, "Relay error");
    metrics::record_relay_failure();
    let body = json!({
        "error": "Proxy error",
        "message": error.to_string(),
        "details": "An error occurred while contacting the upstream server. \
                    It may be unavailable or refusing connections.",
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Methods whose requests carry a payload that must be buffered before
/// dispatch.
fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Handler for `/api` and `/api/{*path}`.
pub async fn relay_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, RelayError> {
    let start = Instant::now();
    let method = request.method().clone();
    let target = state.upstream.url_for(request.uri());

    tracing::debug!(method = %method, target = %target, "Relaying request");

    let (_parts, body) = request.into_parts();
    let body_bytes = if carries_body(&method) {
        let limit = state.config.limits.max_body_bytes;
        Some(to_bytes(body, limit).await.map_err(RelayError::BodyRead)?)
    } else {
        None
    };

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    // The upstream must see its own host, never the inbound one.
    headers.insert(header::HOST, state.upstream.host_header().clone());
    headers.insert(header::ORIGIN, state.upstream.origin_header().clone());
    if let Some(bytes) = &body_bytes {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));
    }

    let mut upstream_request = state
        .client
        .request(method.clone(), target)
        .headers(headers);
    if let Some(bytes) = body_bytes {
        upstream_request = upstream_request.body(bytes);
    }

    let upstream_response = upstream_request.send().await?;
    let status = upstream_response.status();

    let mut response_headers = HeaderMap::new();
    for (name, value) in upstream_response.headers() {
        // The body is re-framed after buffering; forwarding a chunked
        // transfer-encoding declaration would desynchronize framing.
        if name == header::TRANSFER_ENCODING {
            continue;
        }
        response_headers.append(name.clone(), value.clone());
    }

    let body: Bytes = upstream_response.bytes().await?;

    tracing::debug!(
        method = %method,
        status = %status,
        bytes = body.len(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Upstream response relayed"
    );
    metrics::record_relay(method.as_str(), status.as_u16(), start);

    let mut builder = Response::builder().status(status);
    if let Some(headers) = builder.headers_mut() {
        *headers = response_headers;
    }
    Ok(builder.body(Body::from(body))?)
}
