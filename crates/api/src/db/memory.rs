//! In-process agency store.
//!
//! Backs the router tests and local runs without a database. All agencies
//! sit behind one async mutex, so every mutation is atomic with respect to
//! every other.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::Mutex;

use leadmarket_core::{AgencyId, TerritoryLimit, TerritorySet, Zipcode};

use super::{AgencyStore, RepositoryError};
use crate::models::agency::count_of;
use crate::models::{Agency, NewAgency, Territories, TerritoryUpdate};

#[derive(Debug)]
struct StoredAgency {
    agency: Agency,
    password_hash: String,
}

impl StoredAgency {
    fn territories(&self) -> TerritorySet {
        TerritorySet::from_zipcodes(self.agency.zipcodes.iter().cloned())
    }

    fn replace_territories(&mut self, territories: TerritorySet) -> TerritoryUpdate {
        let zipcodes = territories.into_vec();
        self.agency.territory_count = count_of(&zipcodes);
        self.agency.zipcodes = zipcodes;
        self.agency.updated_at = Utc::now();
        TerritoryUpdate {
            zipcodes: self.agency.zipcodes.clone(),
            territory_count: self.agency.territory_count,
        }
    }
}

/// Agency store held in memory.
#[derive(Debug, Default)]
pub struct MemoryAgencyStore {
    agencies: Mutex<HashMap<AgencyId, StoredAgency>>,
}

impl MemoryAgencyStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered agencies.
    pub async fn len(&self) -> usize {
        self.agencies.lock().await.len()
    }

    /// Returns `true` if no agency has registered.
    pub async fn is_empty(&self) -> bool {
        self.agencies.lock().await.is_empty()
    }

    /// Password hash stored for an agency.
    pub async fn password_hash(&self, id: AgencyId) -> Option<String> {
        self.agencies
            .lock()
            .await
            .get(&id)
            .map(|s| s.password_hash.clone())
    }
}

#[async_trait::async_trait]
impl AgencyStore for MemoryAgencyStore {
    async fn create_agency(&self, new: NewAgency) -> Result<Agency, RepositoryError> {
        let mut agencies = self.agencies.lock().await;

        // Emails are stored lowercased, so equality is case-insensitive.
        if agencies.values().any(|s| s.agency.email == new.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let zipcodes = new.territories.into_vec();
        let agency = Agency {
            id: AgencyId::generate(),
            email: new.email,
            agency_name: new.agency_name,
            business_name: Some(new.business_name),
            contact_name: new.contact_name,
            phone: new.phone,
            industry: new.industry,
            plan_id: new.plan_id,
            payment_method_id: new.payment_method_id,
            territory_count: count_of(&zipcodes),
            zipcodes,
            territory_limit: TerritoryLimit::UNLIMITED,
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };

        agencies.insert(
            agency.id,
            StoredAgency {
                agency: agency.clone(),
                password_hash: new.password_hash,
            },
        );
        Ok(agency)
    }

    async fn get_territories(&self, id: AgencyId) -> Result<Territories, RepositoryError> {
        let agencies = self.agencies.lock().await;
        let stored = agencies.get(&id).ok_or(RepositoryError::NotFound)?;
        Ok(Territories {
            zipcodes: stored.agency.zipcodes.clone(),
            territory_count: stored.agency.territory_count,
            territory_limit: stored.agency.territory_limit,
        })
    }

    async fn add_territory(
        &self,
        id: AgencyId,
        zipcode: &Zipcode,
    ) -> Result<TerritoryUpdate, RepositoryError> {
        let mut agencies = self.agencies.lock().await;
        let stored = agencies.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        let mut territories = stored.territories();
        territories.add(zipcode.clone(), stored.agency.territory_limit)?;
        Ok(stored.replace_territories(territories))
    }

    async fn remove_territory(
        &self,
        id: AgencyId,
        zipcode: &Zipcode,
    ) -> Result<TerritoryUpdate, RepositoryError> {
        let mut agencies = self.agencies.lock().await;
        let stored = agencies.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        let mut territories = stored.territories();
        territories.remove(zipcode)?;
        Ok(stored.replace_territories(territories))
    }

    async fn set_territory_limit(
        &self,
        id: AgencyId,
        limit: TerritoryLimit,
    ) -> Result<Territories, RepositoryError> {
        let mut agencies = self.agencies.lock().await;
        let stored = agencies.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        stored.territories().check_limit(limit)?;
        stored.agency.territory_limit = limit;
        stored.agency.updated_at = Utc::now();
        Ok(Territories {
            zipcodes: stored.agency.zipcodes.clone(),
            territory_count: stored.agency.territory_count,
            territory_limit: limit,
        })
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
