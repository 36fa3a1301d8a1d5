//! Domain models for the mobile API.
//!
//! These types represent validated domain objects separate from database row
//! types; the `db` module converts rows into them.

pub mod agency;

pub use agency::{Agency, NewAgency, Territories, TerritoryUpdate};
