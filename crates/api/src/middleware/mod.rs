//! HTTP middleware and extractors for the mobile API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with method, path, status, latency)
//! 3. Request ID (forward or generate `x-request-id`)
//!
//! Authentication is not a layer: handlers that need an agency take the
//! [`RequireAgency`] extractor.

pub mod auth;
pub mod request_id;

pub use auth::RequireAgency;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
