//! Territory management for authenticated agencies.

use leadmarket_core::{AgencyId, Zipcode};

use crate::db::{AgencyStore, RepositoryError};
use crate::models::{Territories, TerritoryUpdate};

/// Territory service.
///
/// Thin layer over [`AgencyStore`] that owns the logging for each
/// territory operation.
pub struct TerritoryService<'a> {
    agencies: &'a dyn AgencyStore,
}

impl<'a> TerritoryService<'a> {
    #[must_use]
    pub const fn new(agencies: &'a dyn AgencyStore) -> Self {
        Self { agencies }
    }

    /// List an agency's territories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown agency.
    pub async fn list(&self, agency_id: AgencyId) -> Result<Territories, RepositoryError> {
        let territories = self.agencies.get_territories(agency_id).await?;
        tracing::debug!(
            %agency_id,
            count = territories.territory_count,
            limit = %territories.territory_limit,
            "Territories fetched"
        );
        Ok(territories)
    }

    /// Add a zipcode to an agency's territories.
    ///
    /// `city` is informational and only logged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Territory` when the zipcode is already held
    /// or the plan limit is reached, `RepositoryError::NotFound` for an
    /// unknown agency.
    pub async fn add(
        &self,
        agency_id: AgencyId,
        zipcode: &Zipcode,
        city: Option<&str>,
    ) -> Result<TerritoryUpdate, RepositoryError> {
        tracing::info!(%agency_id, %zipcode, city, "Adding territory");
        let update = self.agencies.add_territory(agency_id, zipcode).await?;
        tracing::info!(%agency_id, count = update.territory_count, "Territory added");
        Ok(update)
    }

    /// Remove a zipcode from an agency's territories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Territory` when the zipcode is not held,
    /// `RepositoryError::NotFound` for an unknown agency.
    pub async fn remove(
        &self,
        agency_id: AgencyId,
        zipcode: &Zipcode,
    ) -> Result<TerritoryUpdate, RepositoryError> {
        tracing::info!(%agency_id, %zipcode, "Removing territory");
        let update = self.agencies.remove_territory(agency_id, zipcode).await?;
        tracing::info!(%agency_id, count = update.territory_count, "Territory removed");
        Ok(update)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use leadmarket_core::{Email, Industry, TerritoryError, TerritorySet};

    use super::*;
    use crate::db::MemoryAgencyStore;
    use crate::models::NewAgency;

    fn zip(s: &str) -> Zipcode {
        Zipcode::parse(s).unwrap()
    }

    async fn seeded(store: &MemoryAgencyStore) -> AgencyId {
        store
            .create_agency(NewAgency {
                email: Email::parse("owner@acme.com").unwrap(),
                password_hash: "$argon2id$stub".to_owned(),
                agency_name: "Acme".to_owned(),
                business_name: "Acme".to_owned(),
                contact_name: None,
                phone: None,
                industry: Industry::default(),
                plan_id: None,
                payment_method_id: None,
                territories: TerritorySet::from_zipcodes([zip("75001")]),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_add_then_remove_round_trips() {
        let store = MemoryAgencyStore::new();
        let id = seeded(&store).await;
        let service = TerritoryService::new(&store);

        let before = service.list(id).await.unwrap();
        service.add(id, &zip("75002"), Some("Dallas")).await.unwrap();
        let after = service.remove(id, &zip("75002")).await.unwrap();

        assert_eq!(after.zipcodes, before.zipcodes);
        assert_eq!(after.territory_count, before.territory_count);
    }

    #[tokio::test]
    async fn test_second_add_conflicts_and_keeps_single_copy() {
        let store = MemoryAgencyStore::new();
        let id = seeded(&store).await;
        let service = TerritoryService::new(&store);

        service.add(id, &zip("75002"), None).await.unwrap();
        let err = service.add(id, &zip("75002"), None).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Territory(TerritoryError::AlreadyPresent(_))
        ));

        let territories = service.list(id).await.unwrap();
        let copies = territories
            .zipcodes
            .iter()
            .filter(|z| z.as_str() == "75002")
            .count();
        assert_eq!(copies, 1);
    }
}
