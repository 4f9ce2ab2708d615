//! Favorites error types.

use thiserror::Error;

use favorites_core::{AdmitError, ProductId};

use crate::db::RepositoryError;

/// Errors that can occur while managing a favorites list.
#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("user not found")]
    UserNotFound,

    #[error("product not found")]
    ProductNotFound,

    /// The user has no favorites list yet.
    #[error("favorites list not found")]
    ListNotFound,

    /// The user already owns a list.
    #[error("user already has a favorites list")]
    ListAlreadyExists,

    /// The list is at capacity.
    #[error("favorites list cannot hold more than {capacity} products")]
    LimitExceeded { capacity: usize },

    #[error("product {0} is already in the favorites list")]
    AlreadyFavorited(ProductId),

    /// The product is not in the user's list.
    #[error("product is not in the favorites list")]
    NotInList,

    #[error("invalid title: {0}")]
    InvalidTitle(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<AdmitError> for FavoritesError {
    fn from(err: AdmitError) -> Self {
        match err {
            AdmitError::Full { capacity } => Self::LimitExceeded { capacity },
            AdmitError::Duplicate(product_id) => Self::AlreadyFavorited(product_id),
        }
    }
}
