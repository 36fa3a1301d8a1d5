//! Agency registration route.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use leadmarket_core::{AgencyId, Email, Industry, Zipcode};

use crate::error::Result;
use crate::models::Agency;
use crate::routes::JsonBody;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

/// Successful registration response.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    success: bool,
    message: &'static str,
    token: String,
    agency_id: AgencyId,
    user_profile: UserProfile,
}

/// Agency profile returned to the app after sign-up.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    id: AgencyId,
    email: Email,
    agency_name: String,
    business_name: Option<String>,
    contact_name: Option<String>,
    phone: Option<String>,
    industry: Industry,
    zipcodes: Vec<Zipcode>,
    territory_count: u32,
    is_verified: bool,
}

impl From<Agency> for UserProfile {
    fn from(agency: Agency) -> Self {
        Self {
            id: agency.id,
            email: agency.email,
            agency_name: agency.agency_name,
            business_name: agency.business_name,
            contact_name: agency.contact_name,
            phone: agency.phone,
            industry: agency.industry,
            zipcodes: agency.zipcodes,
            territory_count: agency.territory_count,
            is_verified: agency.is_verified,
        }
    }
}

/// Register an agency from the mobile app.
///
/// `POST /api/mobile/auth/register`
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<Registration>,
) -> Result<impl IntoResponse> {
    tracing::info!(
        agency_name = form.agency_name.as_deref(),
        zipcodes_received = form.zipcodes.as_ref().map_or(0, |z| z.received_len()),
        "Mobile registration request"
    );

    let registered = AuthService::new(state.agencies(), state.tokens())
        .register(form)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "Agency registered successfully",
            token: registered.token,
            agency_id: registered.agency.id,
            user_profile: registered.agency.into(),
        }),
    ))
}
