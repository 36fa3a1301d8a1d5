//! Business logic services for the mobile API.
//!
//! # Services
//!
//! - `auth` - Agency registration and bearer tokens
//! - `territories` - Territory listing, add, and remove

pub mod auth;
pub mod territories;

pub use auth::{AuthError, AuthService, TokenIssuer};
pub use territories::TerritoryService;
