//! CLI command implementations.

pub mod agency;
pub mod migrate;
pub mod token;

use secrecy::SecretString;

/// Database URL for the mobile API, with the same fallback the server uses.
fn database_url() -> Option<SecretString> {
    std::env::var("MOBILE_API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
