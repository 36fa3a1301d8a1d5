//! `PostgreSQL` agency store.
//!
//! Territory mutations are single guarded `UPDATE ... RETURNING` statements,
//! so the row lock taken by the update serializes concurrent writers on the
//! same agency. When the guard refuses the update, the current row is read
//! back to report which rule failed.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use leadmarket_core::{AgencyId, Email, Industry, TerritoryLimit, TerritorySet, Zipcode};

use super::{AgencyStore, RepositoryError};
use crate::models::agency::count_of;
use crate::models::{Agency, NewAgency, Territories, TerritoryUpdate};

/// Guarded updates retried when a concurrent writer invalidates the
/// follow-up read before the rule check.
const MAX_GUARDED_ATTEMPTS: u32 = 3;

/// Agency store backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgAgencyStore {
    pool: PgPool,
}

impl PgAgencyStore {
    /// Create a new agency store over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AgencyRow {
    id: AgencyId,
    email: Email,
    agency_name: String,
    business_name: Option<String>,
    contact_name: Option<String>,
    phone: Option<String>,
    industry: String,
    plan_id: Option<String>,
    payment_method_id: Option<String>,
    zipcodes: Vec<String>,
    territory_count: i32,
    territory_limit: i32,
    is_active: bool,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct TerritoriesRow {
    zipcodes: Vec<String>,
    territory_count: i32,
    territory_limit: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct TerritoryUpdateRow {
    zipcodes: Vec<String>,
    territory_count: i32,
}

impl TryFrom<AgencyRow> for Agency {
    type Error = RepositoryError;

    fn try_from(row: AgencyRow) -> Result<Self, Self::Error> {
        let industry = Industry::from_label(&row.industry).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "unknown industry in database: {:?}",
                row.industry
            ))
        })?;

        Ok(Self {
            id: row.id,
            email: row.email,
            agency_name: row.agency_name,
            business_name: row.business_name,
            contact_name: row.contact_name,
            phone: row.phone,
            industry,
            plan_id: row.plan_id,
            payment_method_id: row.payment_method_id,
            zipcodes: parse_zipcodes(row.zipcodes)?,
            territory_count: parse_count(row.territory_count, "territory_count")?,
            territory_limit: TerritoryLimit::new(parse_count(
                row.territory_limit,
                "territory_limit",
            )?),
            is_active: row.is_active,
            is_verified: row.is_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<TerritoriesRow> for Territories {
    type Error = RepositoryError;

    fn try_from(row: TerritoriesRow) -> Result<Self, Self::Error> {
        Ok(Self {
            zipcodes: parse_zipcodes(row.zipcodes)?,
            territory_count: parse_count(row.territory_count, "territory_count")?,
            territory_limit: TerritoryLimit::new(parse_count(
                row.territory_limit,
                "territory_limit",
            )?),
        })
    }
}

impl TryFrom<TerritoryUpdateRow> for TerritoryUpdate {
    type Error = RepositoryError;

    fn try_from(row: TerritoryUpdateRow) -> Result<Self, Self::Error> {
        Ok(Self {
            zipcodes: parse_zipcodes(row.zipcodes)?,
            territory_count: parse_count(row.territory_count, "territory_count")?,
        })
    }
}

fn parse_zipcodes(raw: Vec<String>) -> Result<Vec<Zipcode>, RepositoryError> {
    raw.into_iter()
        .map(|z| {
            Zipcode::try_from(z).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid zipcode in database: {e}"))
            })
        })
        .collect()
}

fn parse_count(raw: i32, column: &str) -> Result<u32, RepositoryError> {
    u32::try_from(raw).map_err(|_| {
        RepositoryError::DataCorruption(format!("negative {column} in database: {raw}"))
    })
}

fn to_db_count(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

// =============================================================================
// Store
// =============================================================================

#[async_trait::async_trait]
impl AgencyStore for PgAgencyStore {
    async fn create_agency(&self, agency: NewAgency) -> Result<Agency, RepositoryError> {
        let territory_count = to_db_count(count_of(agency.territories.as_slice()));
        let zipcodes: Vec<String> = agency
            .territories
            .into_vec()
            .into_iter()
            .map(String::from)
            .collect();

        let row = sqlx::query_as::<_, AgencyRow>(
            r"
            INSERT INTO agencies (
                email, password, agency_name, business_name, contact_name, phone,
                industry, plan_id, payment_method_id, zipcodes,
                territory_count, territory_limit, is_active, is_verified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 0, TRUE, FALSE)
            RETURNING id, email, agency_name, business_name, contact_name, phone,
                      industry, plan_id, payment_method_id, zipcodes,
                      territory_count, territory_limit, is_active, is_verified,
                      created_at, updated_at
            ",
        )
        .bind(agency.email.as_str())
        .bind(&agency.password_hash)
        .bind(&agency.agency_name)
        .bind(&agency.business_name)
        .bind(agency.contact_name.as_deref())
        .bind(agency.phone.as_deref())
        .bind(agency.industry.as_str())
        .bind(agency.plan_id.as_deref())
        .bind(agency.payment_method_id.as_deref())
        .bind(zipcodes)
        .bind(territory_count)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.ok_or(RepositoryError::EmptyResult)?.try_into()
    }

    async fn get_territories(&self, id: AgencyId) -> Result<Territories, RepositoryError> {
        let row = sqlx::query_as::<_, TerritoriesRow>(
            r"
            SELECT zipcodes, territory_count, territory_limit
            FROM agencies
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn add_territory(
        &self,
        id: AgencyId,
        zipcode: &Zipcode,
    ) -> Result<TerritoryUpdate, RepositoryError> {
        for _ in 0..MAX_GUARDED_ATTEMPTS {
            // SET expressions see the pre-update row, hence `+ 1`.
            let row = sqlx::query_as::<_, TerritoryUpdateRow>(
                r"
                UPDATE agencies
                SET zipcodes = array_append(zipcodes, $2),
                    territory_count = cardinality(zipcodes) + 1,
                    updated_at = NOW()
                WHERE id = $1
                  AND NOT ($2 = ANY(zipcodes))
                  AND (territory_limit = 0 OR cardinality(zipcodes) < territory_limit)
                RETURNING zipcodes, territory_count
                ",
            )
            .bind(id)
            .bind(zipcode.as_str())
            .fetch_optional(&self.pool)
            .await?;

            if let Some(row) = row {
                return row.try_into();
            }

            let current = self.get_territories(id).await?;
            TerritorySet::from_zipcodes(current.zipcodes)
                .check_add(zipcode, current.territory_limit)?;

            tracing::debug!(
                agency_id = %id,
                %zipcode,
                "Territory add raced a concurrent update, retrying"
            );
        }

        Err(RepositoryError::Contention(MAX_GUARDED_ATTEMPTS))
    }

    async fn remove_territory(
        &self,
        id: AgencyId,
        zipcode: &Zipcode,
    ) -> Result<TerritoryUpdate, RepositoryError> {
        for _ in 0..MAX_GUARDED_ATTEMPTS {
            let row = sqlx::query_as::<_, TerritoryUpdateRow>(
                r"
                UPDATE agencies
                SET zipcodes = array_remove(zipcodes, $2),
                    territory_count = cardinality(array_remove(zipcodes, $2)),
                    updated_at = NOW()
                WHERE id = $1
                  AND $2 = ANY(zipcodes)
                RETURNING zipcodes, territory_count
                ",
            )
            .bind(id)
            .bind(zipcode.as_str())
            .fetch_optional(&self.pool)
            .await?;

            if let Some(row) = row {
                return row.try_into();
            }

            let current = self.get_territories(id).await?;
            TerritorySet::from_zipcodes(current.zipcodes).remove(zipcode)?;

            tracing::debug!(
                agency_id = %id,
                %zipcode,
                "Territory removal raced a concurrent update, retrying"
            );
        }

        Err(RepositoryError::Contention(MAX_GUARDED_ATTEMPTS))
    }

    async fn set_territory_limit(
        &self,
        id: AgencyId,
        limit: TerritoryLimit,
    ) -> Result<Territories, RepositoryError> {
        let db_limit = to_db_count(limit.get());

        for _ in 0..MAX_GUARDED_ATTEMPTS {
            let row = sqlx::query_as::<_, TerritoriesRow>(
                r"
                UPDATE agencies
                SET territory_limit = $2,
                    updated_at = NOW()
                WHERE id = $1
                  AND ($2 = 0 OR cardinality(zipcodes) <= $2)
                RETURNING zipcodes, territory_count, territory_limit
                ",
            )
            .bind(id)
            .bind(db_limit)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(row) = row {
                return row.try_into();
            }

            let current = self.get_territories(id).await?;
            TerritorySet::from_zipcodes(current.zipcodes).check_limit(limit)?;
        }

        Err(RepositoryError::Contention(MAX_GUARDED_ATTEMPTS))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_zipcodes_rejects_corrupt_rows() {
        let ok = parse_zipcodes(vec!["75001".to_owned(), "75002".to_owned()]).unwrap();
        assert_eq!(ok.len(), 2);

        let err = parse_zipcodes(vec!["75001".to_owned(), "7500".to_owned()]).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn test_parse_count_rejects_negative() {
        assert_eq!(parse_count(3, "territory_count").unwrap(), 3);
        assert!(matches!(
            parse_count(-1, "territory_limit"),
            Err(RepositoryError::DataCorruption(msg)) if msg.contains("territory_limit")
        ));
    }

    #[test]
    fn test_territories_row_conversion() {
        let row = TerritoriesRow {
            zipcodes: vec!["75001".to_owned()],
            territory_count: 1,
            territory_limit: 5,
        };
        let territories = Territories::try_from(row).unwrap();
        assert_eq!(territories.territory_count, 1);
        assert_eq!(territories.territory_limit, TerritoryLimit::new(5));
    }

    #[test]
    fn test_agency_row_rejects_unknown_industry() {
        let row = AgencyRow {
            id: AgencyId::generate(),
            email: Email::parse("owner@agency.com").unwrap(),
            agency_name: "Agency".to_owned(),
            business_name: None,
            contact_name: None,
            phone: None,
            industry: "Plumbing".to_owned(),
            plan_id: None,
            payment_method_id: None,
            zipcodes: vec![],
            territory_count: 0,
            territory_limit: 0,
            is_active: true,
            is_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(
            Agency::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_to_db_count_saturates() {
        assert_eq!(to_db_count(7), 7);
        assert_eq!(to_db_count(u32::MAX), i32::MAX);
    }
}
