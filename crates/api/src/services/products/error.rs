//! Product mirror error types.

use thiserror::Error;

use favorites_core::LimitError;

use crate::catalog::CatalogError;
use crate::db::RepositoryError;

/// Errors that can occur while serving mirrored products.
#[derive(Debug, Error)]
pub enum ProductError {
    #[error(transparent)]
    InvalidLimit(#[from] LimitError),

    #[error("product not found")]
    NotFound,

    /// The upstream catalog could not be reached or returned garbage.
    #[error("catalog unavailable: {0}")]
    Upstream(#[from] CatalogError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
