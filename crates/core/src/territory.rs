//! Territory membership rules.
//!
//! An agency's territories are an ordered list of zipcodes used as a set.
//! [`TerritorySet`] owns the rules for changing that list so that the
//! Postgres store and the in-memory store agree on every outcome.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Zipcode;

/// Why a territory mutation was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TerritoryError {
    /// The zipcode is already one of the agency's territories.
    #[error("zipcode {0} is already in the agency's territories")]
    AlreadyPresent(Zipcode),
    /// The agency's plan allows no more territories.
    #[error("territory limit of {limit} reached")]
    LimitReached {
        /// The plan's limit.
        limit: u32,
    },
    /// The zipcode is not one of the agency's territories.
    #[error("zipcode {0} is not in the agency's territories")]
    NotPresent(Zipcode),
    /// A new limit would be below the territories already held.
    #[error("territory limit of {limit} is below the {count} territories held")]
    LimitBelowCount {
        /// The requested limit.
        limit: u32,
        /// Territories currently held.
        count: usize,
    },
}

/// Maximum number of territories an agency's plan allows.
///
/// Zero means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerritoryLimit(u32);

impl TerritoryLimit {
    /// No cap on territories.
    pub const UNLIMITED: Self = Self(0);

    /// Create a limit. `0` means unlimited.
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self(limit)
    }

    /// The raw limit value (`0` = unlimited).
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns `true` if no cap applies.
    #[must_use]
    pub const fn is_unlimited(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if an agency holding `count` territories may add one more.
    #[must_use]
    pub fn allows_another(self, count: usize) -> bool {
        self.is_unlimited() || count < self.0 as usize
    }
}

impl fmt::Display for TerritoryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An agency's territories with the add/remove rules applied.
///
/// Invariant: no zipcode appears twice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerritorySet {
    zipcodes: Vec<Zipcode>,
}

impl TerritorySet {
    /// Build a set from an ordered list, keeping the first occurrence of
    /// each zipcode.
    #[must_use]
    pub fn from_zipcodes(zipcodes: impl IntoIterator<Item = Zipcode>) -> Self {
        let mut set = Self::default();
        for zipcode in zipcodes {
            if !set.contains(&zipcode) {
                set.zipcodes.push(zipcode);
            }
        }
        set
    }

    /// Returns `true` if `zipcode` is one of the territories.
    #[must_use]
    pub fn contains(&self, zipcode: &Zipcode) -> bool {
        self.zipcodes.contains(zipcode)
    }

    /// Number of territories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zipcodes.len()
    }

    /// Returns `true` if there are no territories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zipcodes.is_empty()
    }

    /// The territories in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[Zipcode] {
        &self.zipcodes
    }

    /// Consume the set and return the ordered zipcodes.
    #[must_use]
    pub fn into_vec(self) -> Vec<Zipcode> {
        self.zipcodes
    }

    /// Check whether `zipcode` could be added under `limit`.
    ///
    /// Membership is checked before the limit, so re-adding an existing
    /// zipcode reports `AlreadyPresent` even when the plan is full.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyPresent` or `LimitReached`.
    pub fn check_add(
        &self,
        zipcode: &Zipcode,
        limit: TerritoryLimit,
    ) -> Result<(), TerritoryError> {
        if self.contains(zipcode) {
            return Err(TerritoryError::AlreadyPresent(zipcode.clone()));
        }
        if !limit.allows_another(self.len()) {
            return Err(TerritoryError::LimitReached { limit: limit.get() });
        }
        Ok(())
    }

    /// Append `zipcode`. On error the set is unchanged.
    ///
    /// # Errors
    ///
    /// See [`TerritorySet::check_add`].
    pub fn add(&mut self, zipcode: Zipcode, limit: TerritoryLimit) -> Result<(), TerritoryError> {
        self.check_add(&zipcode, limit)?;
        self.zipcodes.push(zipcode);
        Ok(())
    }

    /// Check that `limit` can be applied to the territories already held.
    ///
    /// # Errors
    ///
    /// Returns `LimitBelowCount` if a non-zero limit is smaller than the set.
    pub fn check_limit(&self, limit: TerritoryLimit) -> Result<(), TerritoryError> {
        if !limit.is_unlimited() && self.len() > limit.get() as usize {
            return Err(TerritoryError::LimitBelowCount {
                limit: limit.get(),
                count: self.len(),
            });
        }
        Ok(())
    }

    /// Remove `zipcode`. On error the set is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `NotPresent` if the zipcode is not a territory.
    pub fn remove(&mut self, zipcode: &Zipcode) -> Result<(), TerritoryError> {
        let position = self
            .zipcodes
            .iter()
            .position(|z| z == zipcode)
            .ok_or_else(|| TerritoryError::NotPresent(zipcode.clone()))?;
        self.zipcodes.remove(position);
        Ok(())
    }
}
