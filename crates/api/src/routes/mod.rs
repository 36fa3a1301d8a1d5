//! HTTP route handlers for the mobile API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                - Liveness check
//! GET    /health/ready                          - Readiness check (store ping)
//!
//! # Registration (public)
//! POST   /api/mobile/auth/register              - Register an agency, returns token
//!
//! # Territories (bearer token)
//! GET    /api/mobile/territories                - List zipcodes
//! POST   /api/mobile/territories                - Add a zipcode
//! DELETE /api/mobile/territories/{territory_id} - Remove a zipcode
//! ```

pub mod health;
pub mod mobile;

use axum::{
    Router,
    extract::FromRequest,
    routing::{delete, get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// JSON request body whose rejections render as error envelopes.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Create the mobile app routes router.
pub fn mobile_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(mobile::auth::register))
        .route(
            "/territories",
            get(mobile::territories::list).post(mobile::territories::add),
        )
        .route(
            "/territories/{territory_id}",
            delete(mobile::territories::remove),
        )
}

/// Create the main router with all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/mobile", mobile_routes())
}
