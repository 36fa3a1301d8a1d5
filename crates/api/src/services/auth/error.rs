//! Registration and token error types.

use thiserror::Error;

use leadmarket_core::{EmailError, ZipcodeError};

use crate::db::RepositoryError;

/// Errors that can occur while registering an agency.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email, password, or agency name was missing or blank.
    #[error("email, password, and agency_name are required")]
    MissingFields,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Zipcodes were sent in an unsupported shape.
    #[error("invalid zipcodes: {0}")]
    InvalidZipcodes(#[from] ZipcodeError),

    /// An agency already uses this email.
    #[error("email already registered")]
    EmailTaken,

    /// No signing secret is configured, so no token can be issued.
    #[error("JWT secret not configured")]
    SigningSecretMissing,

    /// Token signing failed.
    #[error("token signing failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
