//! Territory routes for authenticated agencies.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use leadmarket_core::{TerritoryLimit, Zipcode};

use crate::error::{AppError, Result};
use crate::middleware::RequireAgency;
use crate::models::TerritoryUpdate;
use crate::routes::JsonBody;
use crate::services::TerritoryService;
use crate::state::AppState;

/// Body of `POST /api/mobile/territories`.
#[derive(Debug, Deserialize)]
pub struct AddTerritoryRequest {
    /// Kept untyped so any non-string is reported as a bad zipcode.
    #[serde(default)]
    zipcode: Option<Value>,
    #[serde(default)]
    city: Option<String>,
}

/// Territory listing.
#[derive(Debug, Serialize)]
pub struct TerritoriesResponse {
    success: bool,
    zipcodes: Vec<Zipcode>,
    territory_count: u32,
    territory_limit: TerritoryLimit,
}

/// Territories after a change.
#[derive(Debug, Serialize)]
pub struct TerritoryChangeResponse {
    success: bool,
    message: &'static str,
    zipcodes: Vec<Zipcode>,
    territory_count: u32,
}

impl TerritoryChangeResponse {
    fn new(message: &'static str, update: TerritoryUpdate) -> Self {
        Self {
            success: true,
            message,
            zipcodes: update.zipcodes,
            territory_count: update.territory_count,
        }
    }
}

/// List the agency's territories.
///
/// `GET /api/mobile/territories`
#[tracing::instrument(skip_all, fields(%agency_id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAgency(agency_id): RequireAgency,
) -> Result<Json<TerritoriesResponse>> {
    let territories = TerritoryService::new(state.agencies())
        .list(agency_id)
        .await
        .map_err(AppError::store("Failed to fetch territories"))?;

    Ok(Json(TerritoriesResponse {
        success: true,
        zipcodes: territories.zipcodes,
        territory_count: territories.territory_count,
        territory_limit: territories.territory_limit,
    }))
}

/// Add a zipcode to the agency's territories.
///
/// `POST /api/mobile/territories`
#[tracing::instrument(skip_all, fields(%agency_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAgency(agency_id): RequireAgency,
    JsonBody(body): JsonBody<AddTerritoryRequest>,
) -> Result<impl IntoResponse> {
    let zipcode = body
        .zipcode
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|z| Zipcode::parse(z).ok())
        .ok_or(AppError::InvalidZipcode)?;

    let update = TerritoryService::new(state.agencies())
        .add(agency_id, &zipcode, body.city.as_deref())
        .await
        .map_err(AppError::store("Failed to add territory"))?;

    Ok((
        StatusCode::CREATED,
        Json(TerritoryChangeResponse::new("Territory added successfully", update)),
    ))
}

/// Remove a zipcode from the agency's territories.
///
/// `DELETE /api/mobile/territories/{territory_id}`
///
/// The path segment is the zipcode itself. A segment that is not a zipcode
/// cannot be held, so it is reported as not found.
#[tracing::instrument(skip_all, fields(%agency_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAgency(agency_id): RequireAgency,
    Path(territory_id): Path<String>,
) -> Result<Json<TerritoryChangeResponse>> {
    let service = TerritoryService::new(state.agencies());

    let Ok(zipcode) = Zipcode::parse(&territory_id) else {
        // Still distinguish a vanished agency from an unknown territory.
        service
            .list(agency_id)
            .await
            .map_err(AppError::store("Failed to remove territory"))?;
        return Err(AppError::TerritoryNotFound(territory_id));
    };

    let update = service
        .remove(agency_id, &zipcode)
        .await
        .map_err(AppError::store("Failed to remove territory"))?;

    Ok(Json(TerritoryChangeResponse::new(
        "Territory removed successfully",
        update,
    )))
}
