//! `x-request-id` propagation.
//!
//! Caller-supplied ids are accepted when they are short printable ASCII;
//! anything else is replaced with a fresh UUID so logs stay greppable.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

const MAX_REQUEST_ID_LEN: usize = 128;

/// Request id attached to every request as an extension.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// The caller's id when usable, otherwise a new v4 UUID.
pub(crate) fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .filter(|id| id.bytes().all(|b| b.is_ascii_graphic()))
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

pub async fn ensure_request_id(mut request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(request.headers());
    // Ids are ASCII-graphic or UUIDs, both valid header values.
    let header = HeaderValue::from_str(&request_id).ok();

    if let Some(value) = header.clone() {
        request.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "route_request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path()
    );
    let mut response = next.run(request).instrument(span).await;
    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
