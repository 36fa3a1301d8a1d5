//! Bearer tokens for the mobile app.
//!
//! Tokens are HS256 JWTs carrying [`AgencyClaims`]. The same [`TokenIssuer`]
//! signs tokens at registration and verifies them on every authenticated
//! request.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use leadmarket_core::{AgencyId, Email};

use crate::config::secret_bytes;

/// Token type claim for mobile app tokens.
pub const MOBILE_TOKEN_TYPE: &str = "mobile";

/// Why a presented token was refused.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed, or expired.
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// Valid signature but not a mobile token.
    #[error("unexpected token type: {0}")]
    WrongType(String),
}

/// Claims carried by a mobile bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyClaims {
    pub agency_id: AgencyId,
    pub email: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies mobile bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer signing with `secret`, minting tokens valid for
    /// `ttl_days`.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_days: u32) -> Self {
        let key = secret_bytes(secret);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl: Duration::days(i64::from(ttl_days)),
        }
    }

    /// Mint a token for an agency.
    ///
    /// # Errors
    ///
    /// Returns the signing error if encoding fails.
    pub fn issue(
        &self,
        agency_id: AgencyId,
        email: &Email,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = AgencyClaims {
            agency_id,
            email: email.as_str().to_owned(),
            token_type: MOBILE_TOKEN_TYPE.to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verify a token's signature, expiry, and type.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for bad or expired tokens and
    /// `TokenError::WrongType` for tokens not minted for the mobile app.
    pub fn verify(&self, token: &str) -> Result<AgencyClaims, TokenError> {
        let data = jsonwebtoken::decode::<AgencyClaims>(token, &self.decoding, &self.validation)?;

        if data.claims.token_type != MOBILE_TOKEN_TYPE {
            return Err(TokenError::WrongType(data.claims.token_type));
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6!";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&SecretString::from(SECRET), 30)
    }

    fn email() -> Email {
        Email::parse("owner@acme.com").unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let issuer = issuer();
        let id = AgencyId::generate();

        let token = issuer.issue(id, &email()).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.agency_id, id);
        assert_eq!(claims.email, "owner@acme.com");
        assert_eq!(claims.token_type, MOBILE_TOKEN_TYPE);
        assert_eq!(claims.exp - claims.iat, Duration::days(30).num_seconds());
    }

    #[test]
    fn test_claims_use_type_key() {
        let claims = AgencyClaims {
            agency_id: AgencyId::generate(),
            email: "owner@acme.com".to_owned(),
            token_type: MOBILE_TOKEN_TYPE.to_owned(),
            iat: 0,
            exp: 1,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["type"], "mobile");
        assert!(json.get("token_type").is_none());
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = issuer().issue(AgencyId::generate(), &email()).unwrap();
        let other = TokenIssuer::new(&SecretString::from("zQ8#wE4!rT6@yU1$iO3%pA5^sD7&fG9*"), 30);

        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let claims = AgencyClaims {
            agency_id: AgencyId::generate(),
            email: "owner@acme.com".to_owned(),
            token_type: MOBILE_TOKEN_TYPE.to_owned(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &issuer.encoding).unwrap();

        assert!(matches!(issuer.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_non_mobile_token_is_rejected() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let claims = AgencyClaims {
            agency_id: AgencyId::generate(),
            email: "owner@acme.com".to_owned(),
            token_type: "admin".to_owned(),
            iat: now,
            exp: now + 3600,
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &issuer.encoding).unwrap();

        assert!(matches!(
            issuer.verify(&token),
            Err(TokenError::WrongType(t)) if t == "admin"
        ));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(issuer().verify("not-a-token").is_err());
    }
}
