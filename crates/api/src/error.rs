//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. `AppError` renders the JSON
//! envelope the mobile app expects:
//!
//! ```json
//! { "success": false, "message": "Territory limit reached", "error": "..." }
//! ```
//!
//! Server errors are captured to Sentry before responding; their internal
//! text never reaches the client.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use leadmarket_core::{EmailError, TerritoryError, Zipcode, ZipcodeError};

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Application-level error type for the mobile API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Registration was missing email, password, or agency name.
    #[error("missing required fields")]
    MissingFields,

    /// Email did not look like an address.
    #[error("invalid email: {0}")]
    InvalidEmail(#[source] EmailError),

    /// Registration zipcodes were neither a list nor a string.
    #[error("invalid zipcodes: {0}")]
    InvalidZipcodes(#[source] ZipcodeError),

    /// A single zipcode was not five digits.
    #[error("invalid zipcode")]
    InvalidZipcode,

    /// The request body was not the JSON we expected.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// Missing, invalid, or expired bearer token.
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    /// An agency already uses this email.
    #[error("email already registered")]
    DuplicateEmail,

    /// The authenticated agency no longer exists.
    #[error("agency not found")]
    AgencyNotFound,

    /// The zipcode is already one of the agency's territories.
    #[error("territory {0} already held")]
    TerritoryExists(Zipcode),

    /// The agency's plan allows no more territories.
    #[error("territory limit of {limit} reached")]
    TerritoryLimitReached { limit: u32 },

    /// The path segment is not one of the agency's territories.
    #[error("territory {0:?} not found")]
    TerritoryNotFound(String),

    /// The server is missing configuration needed for this request.
    #[error("server configuration error: {0}")]
    Configuration(&'static str),

    /// Anything else; reported to clients as `message`.
    #[error("{message}: {source}")]
    Internal {
        message: &'static str,
        detail: &'static str,
        #[source]
        source: BoxError,
    },
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    message: String,
    error: String,
}

impl AppError {
    /// Wrap an unexpected failure, shown to clients as `message`.
    pub fn internal(message: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Internal {
            message,
            detail: "Internal server error",
            source: source.into(),
        }
    }

    /// Map a store failure during a territory operation.
    ///
    /// `message` is what clients see if the failure is not one of the
    /// expected outcomes. Plan-limit changes are not made over HTTP, so a
    /// `LimitBelowCount` here is an internal error.
    pub fn store(message: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |err| match err {
            RepositoryError::NotFound => Self::AgencyNotFound,
            RepositoryError::Territory(TerritoryError::AlreadyPresent(zipcode)) => {
                Self::TerritoryExists(zipcode)
            }
            RepositoryError::Territory(TerritoryError::LimitReached { limit }) => {
                Self::TerritoryLimitReached { limit }
            }
            RepositoryError::Territory(TerritoryError::NotPresent(zipcode)) => {
                Self::TerritoryNotFound(zipcode.into())
            }
            other => Self::internal(message, other),
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields
            | Self::InvalidEmail(_)
            | Self::InvalidZipcodes(_)
            | Self::InvalidZipcode
            | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::DuplicateEmail | Self::TerritoryExists(_) => StatusCode::CONFLICT,
            Self::TerritoryLimitReached { .. } => StatusCode::FORBIDDEN,
            Self::AgencyNotFound | Self::TerritoryNotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn envelope(&self) -> ErrorEnvelope {
        let (message, error): (&str, String) = match self {
            Self::MissingFields => (
                "Missing required fields",
                "email, password, and agency_name are required".to_owned(),
            ),
            Self::InvalidEmail(_) => (
                "Invalid email format",
                "Email must look like name@example.com".to_owned(),
            ),
            Self::InvalidZipcodes(_) => (
                "Invalid zipcodes format",
                "Zipcodes must be an array of 5-digit strings".to_owned(),
            ),
            Self::InvalidZipcode => (
                "Invalid zipcode format",
                "Zipcode must be a 5-digit number".to_owned(),
            ),
            Self::MalformedBody(reason) => ("Invalid request body", reason.clone()),
            Self::Unauthorized(reason) => ("Unauthorized", (*reason).to_owned()),
            Self::DuplicateEmail => (
                "Email already registered",
                "An account with this email already exists".to_owned(),
            ),
            Self::AgencyNotFound => (
                "Agency not found",
                "No agency matches this token".to_owned(),
            ),
            Self::TerritoryExists(_) => (
                "Zipcode already exists",
                "This zipcode is already in your territories".to_owned(),
            ),
            Self::TerritoryLimitReached { limit } => (
                "Territory limit reached",
                format!("You can only have {limit} territories. Upgrade your plan for more."),
            ),
            Self::TerritoryNotFound(_) => (
                "Territory not found",
                "This zipcode is not in your territories".to_owned(),
            ),
            Self::Configuration(reason) => ("Server configuration error", (*reason).to_owned()),
            Self::Internal {
                message, detail, ..
            } => (message, (*detail).to_owned()),
        };

        ErrorEnvelope {
            success: false,
            message: message.to_owned(),
            error,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(self.envelope())).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingFields => Self::MissingFields,
            AuthError::InvalidEmail(e) => Self::InvalidEmail(e),
            AuthError::InvalidZipcodes(e) => Self::InvalidZipcodes(e),
            AuthError::EmailTaken => Self::DuplicateEmail,
            AuthError::SigningSecretMissing => Self::Configuration("JWT secret not configured"),
            AuthError::Repository(RepositoryError::EmptyResult) => Self::Internal {
                message: "Failed to create agency",
                detail: "No data returned from database",
                source: Box::new(RepositoryError::EmptyResult),
            },
            AuthError::Repository(e) => Self::internal("Failed to create agency", e),
            e @ (AuthError::PasswordHash | AuthError::Token(_)) => {
                Self::internal("Internal server error", e)
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an agency ID.
///
/// Call this after successful authentication to associate errors with agencies.
pub fn set_sentry_agency(agency_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(agency_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    fn zip(s: &str) -> Zipcode {
        Zipcode::parse(s).unwrap()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(get_status(AppError::MissingFields), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(AppError::InvalidZipcode), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(AppError::Unauthorized("missing token")),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(get_status(AppError::DuplicateEmail), StatusCode::CONFLICT);
        assert_eq!(get_status(AppError::AgencyNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(AppError::TerritoryExists(zip("75001"))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::TerritoryLimitReached { limit: 3 }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::TerritoryNotFound("99999".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Configuration("JWT secret not configured")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_limit_message_names_limit() {
        let envelope = AppError::TerritoryLimitReached { limit: 5 }.envelope();
        assert_eq!(envelope.message, "Territory limit reached");
        assert_eq!(
            envelope.error,
            "You can only have 5 territories. Upgrade your plan for more."
        );
    }

    #[test]
    fn test_internal_error_hides_source() {
        let err = AppError::store("Failed to add territory")(RepositoryError::DataCorruption(
            "zipcodes column holds 'DROP TABLE'".to_owned(),
        ));
        let json = serde_json::to_string(&err.envelope()).unwrap();

        assert!(json.contains("Failed to add territory"));
        assert!(!json.contains("DROP TABLE"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_store_mapping() {
        let map = AppError::store("Failed to fetch territories");
        assert!(matches!(map(RepositoryError::NotFound), AppError::AgencyNotFound));

        let map = AppError::store("Failed to remove territory");
        assert!(matches!(
            map(RepositoryError::Territory(TerritoryError::NotPresent(zip("75001")))),
            AppError::TerritoryNotFound(z) if z == "75001"
        ));

        let map = AppError::store("Failed to add territory");
        assert!(matches!(
            map(RepositoryError::Territory(TerritoryError::AlreadyPresent(zip("75001")))),
            AppError::TerritoryExists(_)
        ));
    }

    #[test]
    fn test_limit_below_count_is_internal() {
        let map = AppError::store("Failed to add territory");
        let err = map(RepositoryError::Territory(TerritoryError::LimitBelowCount {
            limit: 1,
            count: 2,
        }));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.envelope().error, "Internal server error");
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            AppError::from(AuthError::EmailTaken),
            AppError::DuplicateEmail
        ));

        let err = AppError::from(AuthError::Repository(RepositoryError::EmptyResult));
        let envelope = err.envelope();
        assert_eq!(envelope.message, "Failed to create agency");
        assert_eq!(envelope.error, "No data returned from database");

        let err = AppError::from(AuthError::SigningSecretMissing);
        assert_eq!(err.envelope().message, "Server configuration error");
    }

    #[test]
    fn test_envelope_always_carries_error() {
        let errors = [
            AppError::AgencyNotFound,
            AppError::InvalidEmail(EmailError::MissingAtSymbol),
            AppError::TerritoryNotFound("not-a-zip".to_owned()),
        ];
        for err in errors {
            let json = serde_json::to_value(err.envelope()).unwrap();
            assert_eq!(json["success"], false);
            assert!(json["message"].is_string());
            assert!(
                json["error"].as_str().is_some_and(|e| !e.is_empty()),
                "{json}"
            );
        }
    }
}
