//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::AgencyStore;
use crate::services::TokenIssuer;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the agency store and the token issuer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    agencies: Arc<dyn AgencyStore>,
    tokens: Option<TokenIssuer>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `agencies` - Agency store (Postgres in production, in-memory in tests)
    #[must_use]
    pub fn new(config: &ApiConfig, agencies: Arc<dyn AgencyStore>) -> Self {
        let tokens = config
            .jwt_secret
            .as_ref()
            .map(|secret| TokenIssuer::new(secret, config.token_ttl_days));

        if tokens.is_none() {
            tracing::warn!("JWT_SECRET not set: registration and authenticated routes will fail");
        }

        Self {
            inner: Arc::new(AppStateInner {
                agencies,
                tokens,
            }),
        }
    }

    /// Get a reference to the agency store.
    #[must_use]
    pub fn agencies(&self) -> &dyn AgencyStore {
        self.inner.agencies.as_ref()
    }

    /// Get the token issuer, if a signing secret is configured.
    #[must_use]
    pub fn tokens(&self) -> Option<&TokenIssuer> {
        self.inner.tokens.as_ref()
    }
}
