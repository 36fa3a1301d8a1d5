//! Leads Marketplace Core - Shared domain types.
//!
//! This crate provides the types shared by the mobile API and its tooling:
//! - `api` - Mobile registration and territory HTTP service
//! - `cli` - Command-line tools for migrations and token minting
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. Validation of client input and the territory membership
//! rules live here so every store implementation enforces them identically.
//!
//! # Modules
//!
//! - [`types`] - Validated newtypes (emails, zipcodes, industries, IDs)
//! - [`territory`] - Zipcode-set rules for adding and removing territories

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod territory;
pub mod types;

pub use territory::{TerritoryError, TerritoryLimit, TerritorySet};
pub use types::*;
