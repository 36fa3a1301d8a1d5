//! Mobile app endpoints.

pub mod auth;
pub mod territories;
