//! Bearer token authentication.
//!
//! Provides the extractor that resolves the calling agency from the
//! `Authorization: Bearer <token>` header.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use leadmarket_core::AgencyId;

use crate::error::{AppError, set_sentry_agency};
use crate::state::AppState;

/// Extractor that requires a valid mobile bearer token.
///
/// Yields the agency the token was issued to. Requests without a usable
/// token are rejected with a 401 envelope before the handler runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn list(RequireAgency(agency_id): RequireAgency) -> impl IntoResponse {
///     format!("Hello, {agency_id}!")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAgency(pub AgencyId);

impl FromRequestParts<AppState> for RequireAgency {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized("Missing bearer token"))?;

        let Some(tokens) = state.tokens() else {
            return Err(AppError::Configuration("JWT secret not configured"));
        };

        let claims = tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::Unauthorized("Invalid or expired token")
        })?;

        set_sentry_agency(&claims.agency_id);
        Ok(Self(claims.agency_id))
    }
}

/// Extract the token from an `Authorization: Bearer` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
