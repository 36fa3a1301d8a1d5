//! Agency management commands.
//!
//! # Usage
//!
//! ```bash
//! # Cap an agency at 10 territories
//! lm-cli agency set-limit --agency-id 3f6c... --limit 10
//!
//! # Remove the cap
//! lm-cli agency set-limit --agency-id 3f6c... --limit 0
//! ```
//!
//! # Environment Variables
//!
//! - `MOBILE_API_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use thiserror::Error;

use leadmarket_api::db::{AgencyStore, PgAgencyStore, RepositoryError, create_pool};
use leadmarket_core::{AgencyId, TerritoryLimit};

/// Errors that can occur during agency operations.
#[derive(Debug, Error)]
pub enum AgencyError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store refused the change.
    #[error("{0}")]
    Repository(#[from] RepositoryError),
}

/// Set an agency's territory limit.
///
/// # Errors
///
/// Returns `AgencyError` if the agency does not exist or already holds more
/// territories than the new limit.
pub async fn set_limit(agency_id: AgencyId, limit: TerritoryLimit) -> Result<(), AgencyError> {
    let _ = dotenvy::dotenv();

    let database_url =
        super::database_url().ok_or(AgencyError::MissingEnvVar("MOBILE_API_DATABASE_URL"))?;
    let pool = create_pool(&database_url).await?;

    let territories = PgAgencyStore::new(pool)
        .set_territory_limit(agency_id, limit)
        .await?;

    tracing::info!(
        %agency_id,
        limit = %territories.territory_limit,
        count = territories.territory_count,
        "Territory limit updated"
    );
    Ok(())
}
