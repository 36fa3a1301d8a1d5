//! Core types for the mobile API.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod industry;
pub mod zipcode;

pub use email::{Email, EmailError};
pub use id::*;
pub use industry::Industry;
pub use zipcode::{Zipcode, ZipcodeError, ZipcodeInput};
