//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::catalog::{CatalogClient, CatalogError};
use crate::config::ApiConfig;
use crate::services::token::{TokenError, TokenIssuer};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("catalog client: {0}")]
    Catalog(#[from] CatalogError),
    #[error("token issuer: {0}")]
    Token(#[from] TokenError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and the upstream client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    catalog: CatalogClient,
    tokens: TokenIssuer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog HTTP client cannot be built or the
    /// JWT keys cannot be loaded.
    pub fn new(config: &ApiConfig, pool: PgPool) -> Result<Self, StateError> {
        let catalog = CatalogClient::new(&config.catalog)?;
        let tokens = TokenIssuer::new(&config.jwt)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                pool,
                catalog,
                tokens,
            }),
        })
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the upstream catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the access token issuer.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }
}
