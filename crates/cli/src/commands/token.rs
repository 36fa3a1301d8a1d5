//! Bearer token commands.
//!
//! # Usage
//!
//! ```bash
//! lm-cli token issue --agency-id 3f6c... --email owner@acme.com
//! ```
//!
//! # Environment Variables
//!
//! - `JWT_SECRET` - Signing secret shared with the API server

use secrecy::SecretString;
use thiserror::Error;

use leadmarket_api::services::TokenIssuer;
use leadmarket_core::{AgencyId, Email, EmailError};

/// Errors that can occur while issuing a token.
#[derive(Debug, Error)]
pub enum TokenCommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Token signing failed: {0}")]
    Signing(#[from] leadmarket_api::services::AuthError),
}

/// Issue a mobile bearer token and print it to stdout.
///
/// # Errors
///
/// Returns `TokenCommandError` if the secret is missing, the email is
/// invalid, or signing fails.
pub fn issue(agency_id: AgencyId, email: &str, ttl_days: u32) -> Result<(), TokenCommandError> {
    let _ = dotenvy::dotenv();

    let secret = std::env::var("JWT_SECRET")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(SecretString::from)
        .ok_or(TokenCommandError::MissingEnvVar("JWT_SECRET"))?;
    let email = Email::parse(email)?;

    let token = TokenIssuer::new(&secret, ttl_days)
        .issue(agency_id, &email)
        .map_err(leadmarket_api::services::AuthError::from)?;

    tracing::info!(%agency_id, ttl_days, "Issued mobile token");

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }
    Ok(())
}
