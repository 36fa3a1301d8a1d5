//! Agency registration.
//!
//! Validates the sign-up form, hashes the password, stores the agency, and
//! mints the mobile bearer token returned to the app.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{AgencyClaims, MOBILE_TOKEN_TYPE, TokenError, TokenIssuer};

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use serde::Deserialize;

use leadmarket_core::{Email, Industry, TerritorySet, ZipcodeInput};

use crate::db::{AgencyStore, RepositoryError};
use crate::models::{Agency, NewAgency};

/// Sign-up form sent by the mobile app.
///
/// Every field is optional at the JSON level so that missing required
/// fields produce a validation error rather than a body rejection.
/// No `Debug`: the password must never reach a log line.
#[derive(Default, Deserialize)]
pub struct Registration {
    pub email: Option<String>,
    pub password: Option<String>,
    pub agency_name: Option<String>,
    pub business_name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    pub plan_id: Option<String>,
    pub payment_method_id: Option<String>,
    #[serde(default)]
    pub zipcodes: Option<ZipcodeInput>,
}

/// A stored agency together with its freshly minted token.
#[derive(Debug)]
pub struct Registered {
    pub agency: Agency,
    pub token: String,
}

/// Registration service.
pub struct AuthService<'a> {
    agencies: &'a dyn AgencyStore,
    tokens: Option<&'a TokenIssuer>,
}

impl<'a> AuthService<'a> {
    /// Create a new registration service.
    ///
    /// `tokens` is `None` when no signing secret is configured; registration
    /// then fails before anything is stored.
    #[must_use]
    pub const fn new(agencies: &'a dyn AgencyStore, tokens: Option<&'a TokenIssuer>) -> Self {
        Self { agencies, tokens }
    }

    /// Register a new agency and mint its bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if email, password, or agency name is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidZipcodes` if zipcodes are neither a list nor a string.
    /// Returns `AuthError::SigningSecretMissing` if no token can be issued.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn register(&self, form: Registration) -> Result<Registered, AuthError> {
        let (Some(email), Some(password), Some(agency_name)) = (
            non_blank(form.email),
            form.password.filter(|p| !p.is_empty()),
            non_blank(form.agency_name),
        ) else {
            return Err(AuthError::MissingFields);
        };

        let email = Email::parse(&email)?;

        let territories = match &form.zipcodes {
            Some(input) => {
                if input.is_legacy() {
                    tracing::warn!("Zipcodes received as a comma-separated string");
                }
                let zipcodes = input.normalize().inspect_err(|_| {
                    tracing::warn!("Rejecting registration with malformed zipcodes");
                })?;
                let territories = TerritorySet::from_zipcodes(zipcodes);
                tracing::info!(
                    received = input.received_len(),
                    valid = territories.len(),
                    "Zipcodes validated"
                );
                territories
            }
            None => TerritorySet::default(),
        };

        let industry = Industry::resolve(form.industry.as_deref());
        if let Some(raw) = form.industry.as_deref()
            && Industry::from_label(raw).is_none()
        {
            tracing::warn!(industry = raw, default = %industry, "Unknown industry, using default");
        }

        // Refuse before inserting so a misconfigured server leaves no orphan rows.
        let tokens = self.tokens.ok_or(AuthError::SigningSecretMissing)?;

        let password_hash = hash_password(&password)?;

        let agency = self
            .agencies
            .create_agency(NewAgency {
                email,
                password_hash,
                business_name: non_blank(form.business_name).unwrap_or_else(|| agency_name.clone()),
                agency_name,
                contact_name: non_blank(form.contact_name),
                phone: non_blank(form.phone),
                industry,
                plan_id: form.plan_id.filter(|s| !s.is_empty()),
                payment_method_id: form.payment_method_id.filter(|s| !s.is_empty()),
                territories,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(
            agency_id = %agency.id,
            territory_count = agency.territory_count,
            "Agency registered"
        );

        let token = tokens.issue(agency.id, &agency.email)?;

        Ok(Registered { agency, token })
    }
}

/// Trim a text field, treating blank as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};
    use secrecy::SecretString;
    use serde_json::json;

    use leadmarket_core::Zipcode;

    use super::*;
    use crate::db::MemoryAgencyStore;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6!"), 30)
    }

    fn form(value: serde_json::Value) -> Registration {
        serde_json::from_value(value).unwrap()
    }

    fn zips(agency: &Agency) -> Vec<&str> {
        agency.zipcodes.iter().map(Zipcode::as_str).collect()
    }

    #[tokio::test]
    async fn test_register_stores_normalized_agency() {
        let store = MemoryAgencyStore::new();
        let tokens = issuer();
        let service = AuthService::new(&store, Some(&tokens));

        let registered = service
            .register(form(json!({
                "email": "  Owner@Acme.COM ",
                "password": "hunter22",
                "agency_name": "  Acme Home Care ",
                "contact_name": "   ",
                "phone": " 555-0100 ",
                "industry": "Insurance",
                "plan_id": "",
                "zipcodes": ["75001", "7500", "75002x"]
            })))
            .await
            .unwrap();

        let agency = &registered.agency;
        assert_eq!(agency.email.as_str(), "owner@acme.com");
        assert_eq!(agency.agency_name, "Acme Home Care");
        assert_eq!(agency.business_name.as_deref(), Some("Acme Home Care"));
        assert_eq!(agency.contact_name, None);
        assert_eq!(agency.phone.as_deref(), Some("555-0100"));
        assert_eq!(agency.industry, Industry::Insurance);
        assert_eq!(agency.plan_id, None);
        assert_eq!(zips(agency), ["75001"]);
        assert_eq!(agency.territory_count, 1);

        let claims = tokens.verify(&registered.token).unwrap();
        assert_eq!(claims.agency_id, agency.id);
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let store = MemoryAgencyStore::new();
        let tokens = issuer();
        let service = AuthService::new(&store, Some(&tokens));

        let registered = service
            .register(form(json!({
                "email": "owner@acme.com",
                "password": "hunter22",
                "agency_name": "Acme"
            })))
            .await
            .unwrap();

        let hash = store.password_hash(registered.agency.id).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"hunter22", &parsed).is_ok());
    }

    #[tokio::test]
    async fn test_register_dedupes_and_accepts_legacy_string() {
        let store = MemoryAgencyStore::new();
        let tokens = issuer();
        let service = AuthService::new(&store, Some(&tokens));

        let registered = service
            .register(form(json!({
                "email": "owner@acme.com",
                "password": "hunter22",
                "agency_name": "Acme",
                "zipcodes": "75002, 75001,75002"
            })))
            .await
            .unwrap();

        assert_eq!(zips(&registered.agency), ["75002", "75001"]);
        assert_eq!(registered.agency.territory_count, 2);
    }

    #[tokio::test]
    async fn test_register_unknown_industry_defaults() {
        let store = MemoryAgencyStore::new();
        let tokens = issuer();
        let service = AuthService::new(&store, Some(&tokens));

        let registered = service
            .register(form(json!({
                "email": "owner@acme.com",
                "password": "hunter22",
                "agency_name": "Acme",
                "industry": "Plumbing"
            })))
            .await
            .unwrap();

        assert_eq!(registered.agency.industry, Industry::Healthcare);
    }

    #[tokio::test]
    async fn test_register_requires_fields() {
        let store = MemoryAgencyStore::new();
        let tokens = issuer();
        let service = AuthService::new(&store, Some(&tokens));

        for body in [
            json!({"password": "hunter22", "agency_name": "Acme"}),
            json!({"email": "owner@acme.com", "agency_name": "Acme"}),
            json!({"email": "owner@acme.com", "password": "", "agency_name": "Acme"}),
            json!({"email": "owner@acme.com", "password": "hunter22", "agency_name": "  "}),
        ] {
            let err = service.register(form(body)).await.unwrap_err();
            assert!(matches!(err, AuthError::MissingFields));
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_email_and_zipcodes() {
        let store = MemoryAgencyStore::new();
        let tokens = issuer();
        let service = AuthService::new(&store, Some(&tokens));

        let err = service
            .register(form(json!({
                "email": "not-an-email",
                "password": "hunter22",
                "agency_name": "Acme"
            })))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));

        let err = service
            .register(form(json!({
                "email": "owner@acme.com",
                "password": "hunter22",
                "agency_name": "Acme",
                "zipcodes": 75001
            })))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidZipcodes(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let store = MemoryAgencyStore::new();
        let tokens = issuer();
        let service = AuthService::new(&store, Some(&tokens));
        let body = json!({
            "email": "owner@acme.com",
            "password": "hunter22",
            "agency_name": "Acme"
        });

        service.register(form(body.clone())).await.unwrap();
        let err = service.register(form(body)).await.unwrap_err();

        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_register_without_secret_stores_nothing() {
        let store = MemoryAgencyStore::new();
        let service = AuthService::new(&store, None);

        let err = service
            .register(form(json!({
                "email": "owner@acme.com",
                "password": "hunter22",
                "agency_name": "Acme"
            })))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::SigningSecretMissing));
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  a ".to_owned())).as_deref(), Some("a"));
        assert_eq!(non_blank(Some("   ".to_owned())), None);
        assert_eq!(non_blank(None), None);
    }
}
