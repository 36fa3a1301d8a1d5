//! Request ID middleware for request tracing and correlation.
//!
//! Each request gets an ID, either forwarded from an upstream proxy or
//! freshly generated. The ID is recorded on the request span and the Sentry
//! scope, and echoed in the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID that is trusted as-is.
const MAX_FORWARDED_LEN: usize = 128;

/// Middleware that ensures every request has a request ID.
///
/// Upstream IDs are only reused when short and made of visible ASCII;
/// anything else is replaced with a UUID v4 so that client-supplied values
/// cannot inject into logs.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| is_acceptable(id))
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn is_acceptable(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_FORWARDED_LEN && id.bytes().all(|b| b.is_ascii_graphic())
}
