//! Origin gate middleware.
//!
//! Runs before the relay (and the static asset service): checks the declared
//! `Origin` against the allow-list, answers preflight requests locally, and
//! attaches credentialed CORS headers to admitted cross-origin responses.
//! A rejected origin never reaches the upstream.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::AllowList;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Methods advertised on preflight responses.
const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Headers advertised when the preflight does not request specific ones.
const DEFAULT_ALLOWED_HEADERS: &str = "Content-Type,Authorization";

/// Outcome of checking one request's declared origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginDecision {
    /// No `Origin` header: same-origin or non-browser caller, admitted as-is.
    NotDeclared,
    /// Origin is allow-listed; echo this specific value back (never `*`,
    /// because credentials are permitted).
    Allowed(String),
    /// Origin is declared but not allow-listed.
    Rejected,
}

/// Pure admission rule, separated from the middleware for testability.
pub fn evaluate_origin(origin: Option<&str>, allow_list: &AllowList) -> OriginDecision {
    match origin {
        None => OriginDecision::NotDeclared,
        Some(origin) if allow_list.contains(origin) => OriginDecision::Allowed(origin.to_string()),
        Some(_) => OriginDecision::Rejected,
    }
}

pub async fn origin_gate_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    match evaluate_origin(origin.as_deref(), &state.config.allow_list) {
        OriginDecision::NotDeclared => next.run(request).await,
        OriginDecision::Rejected => {
            tracing::warn!(
                origin = origin.as_deref().unwrap_or_default(),
                "Origin not in allow-list, rejecting"
            );
            metrics::record_origin_rejection();
            (StatusCode::FORBIDDEN, "Not allowed by CORS").into_response()
        }
        OriginDecision::Allowed(origin) => {
            // Preflight is browser-only negotiation; answer it here instead
            // of forwarding it upstream.
            if request.method() == Method::OPTIONS {
                let requested_headers = request
                    .headers()
                    .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
                    .cloned();
                return preflight_response(&origin, requested_headers);
            }

            let mut response = next.run(request).await;
            apply_cors_headers(response.headers_mut(), &origin);
            response
        }
    }
}

/// CORS headers for an admitted credentialed request: the specific origin,
/// never a wildcard.
fn apply_cors_headers(headers: &mut HeaderMap, origin: &str) {
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(header::VARY, HeaderValue::from_static("Origin"));
}

fn preflight_response(origin: &str, requested_headers: Option<HeaderValue>) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    apply_cors_headers(headers, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        requested_headers.unwrap_or_else(|| HeaderValue::from_static(DEFAULT_ALLOWED_HEADERS)),
    );
    response
}
