//! Agency persistence.
//!
//! # Database
//!
//! A single table, `agencies`, keyed by a store-assigned UUID:
//!
//! - `email` - unique on `lower(email)`
//! - `password` - Argon2 PHC string
//! - profile columns (`agency_name`, `business_name`, `contact_name`, `phone`, `industry`)
//! - `zipcodes TEXT[]`, `territory_count`, `territory_limit` (0 = unlimited)
//! - `is_active`, `is_verified`, `created_at`, `updated_at`
//!
//! # Implementations
//!
//! - [`PgAgencyStore`] - `PostgreSQL` via `sqlx`
//! - [`MemoryAgencyStore`] - in-process map for tests and local runs
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p leadmarket-cli -- migrate
//! ```

pub mod agencies;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use leadmarket_core::{AgencyId, TerritoryError, TerritoryLimit, Zipcode};

use crate::models::{Agency, NewAgency, Territories, TerritoryUpdate};

pub use agencies::PgAgencyStore;
pub use memory::MemoryAgencyStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested agency was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// An insert reported success but returned no row.
    #[error("insert returned no row")]
    EmptyResult,

    /// A territory rule refused the change.
    #[error(transparent)]
    Territory(#[from] TerritoryError),

    /// A guarded update kept losing to concurrent writers.
    #[error("gave up after {0} conflicting concurrent updates")]
    Contention(u32),
}

/// Storage for agencies and their territories.
///
/// Each territory mutation is atomic per agency: concurrent adds or removes
/// on the same agency never lose each other's changes.
#[async_trait]
pub trait AgencyStore: Send + Sync {
    /// Insert a new agency.
    ///
    /// # Errors
    ///
    /// `Conflict` if the email is taken, `EmptyResult` if no row comes back.
    async fn create_agency(&self, agency: NewAgency) -> Result<Agency, RepositoryError>;

    /// Read an agency's territories.
    ///
    /// # Errors
    ///
    /// `NotFound` if the agency does not exist.
    async fn get_territories(&self, id: AgencyId) -> Result<Territories, RepositoryError>;

    /// Append a zipcode to an agency's territories.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown agency; `Territory(AlreadyPresent)` or
    /// `Territory(LimitReached)` when the rules refuse the zipcode.
    async fn add_territory(
        &self,
        id: AgencyId,
        zipcode: &Zipcode,
    ) -> Result<TerritoryUpdate, RepositoryError>;

    /// Remove a zipcode from an agency's territories.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown agency; `Territory(NotPresent)` if the
    /// zipcode is not held.
    async fn remove_territory(
        &self,
        id: AgencyId,
        zipcode: &Zipcode,
    ) -> Result<TerritoryUpdate, RepositoryError>;

    /// Apply a plan's territory limit.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown agency; `Territory(LimitBelowCount)` if the
    /// agency already holds more territories than the new limit.
    async fn set_territory_limit(
        &self,
        id: AgencyId,
        limit: TerritoryLimit,
    ) -> Result<Territories, RepositoryError>;

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns the underlying failure if it is not.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
