//! Agency domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use leadmarket_core::{AgencyId, Email, Industry, TerritoryLimit, TerritorySet, Zipcode};

/// A registered agency (domain type).
///
/// Carries no password hash: it is written once at registration and never
/// read back through this type.
#[derive(Debug, Clone)]
pub struct Agency {
    /// Store-assigned identity.
    pub id: AgencyId,
    /// Login email, lowercased.
    pub email: Email,
    /// Agency display name.
    pub agency_name: String,
    /// Legal business name.
    pub business_name: Option<String>,
    /// Primary contact person.
    pub contact_name: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Industry the agency sells into.
    pub industry: Industry,
    /// Subscription plan chosen at sign-up.
    pub plan_id: Option<String>,
    /// Payment method captured at sign-up.
    pub payment_method_id: Option<String>,
    /// Territories, in the order they were added.
    pub zipcodes: Vec<Zipcode>,
    /// Always equal to `zipcodes.len()`.
    pub territory_count: u32,
    /// Plan cap on territories.
    pub territory_limit: TerritoryLimit,
    /// Whether the account may log in.
    pub is_active: bool,
    /// Whether the agency has been verified by staff.
    pub is_verified: bool,
    /// When the agency registered.
    pub created_at: DateTime<Utc>,
    /// When the agency was last modified.
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a new agency.
///
/// New agencies always start active, unverified, with an unlimited
/// territory limit until a plan assigns one.
#[derive(Debug, Clone)]
pub struct NewAgency {
    pub email: Email,
    pub password_hash: String,
    pub agency_name: String,
    pub business_name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub industry: Industry,
    pub plan_id: Option<String>,
    pub payment_method_id: Option<String>,
    pub territories: TerritorySet,
}

/// An agency's territory state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Territories {
    pub zipcodes: Vec<Zipcode>,
    pub territory_count: u32,
    pub territory_limit: TerritoryLimit,
}

/// Territory state returned after an add or remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerritoryUpdate {
    pub zipcodes: Vec<Zipcode>,
    pub territory_count: u32,
}

/// Territory count for a list of zipcodes.
///
/// Lists are bounded far below `u32::MAX` by the request body limit.
#[must_use]
pub fn count_of(zipcodes: &[Zipcode]) -> u32 {
    u32::try_from(zipcodes.len()).unwrap_or(u32::MAX)
}
