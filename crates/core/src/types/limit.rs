//! Page size accepted by the product catalog.

use serde::{Deserialize, Serialize};

/// Error returned when a requested page size is out of range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("limit cannot be greater than {max} (got {requested})")]
pub struct LimitError {
    pub requested: u32,
    pub max: u32,
}

/// Number of products to return from the catalog, capped at [`ProductLimit::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ProductLimit(u32);

impl ProductLimit {
    pub const MAX: u32 = 100;
    pub const DEFAULT: Self = Self(10);

    /// Validate a requested page size.
    ///
    /// # Errors
    ///
    /// Returns [`LimitError`] if `requested` exceeds [`ProductLimit::MAX`].
    pub const fn new(requested: u32) -> Result<Self, LimitError> {
        if requested > Self::MAX {
            return Err(LimitError {
                requested,
                max: Self::MAX,
            });
        }
        Ok(Self(requested))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The limit as a collection length.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// The limit as a SQL `LIMIT` argument.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0 as i64
    }
}

impl Default for ProductLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for ProductLimit {
    type Error = LimitError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductLimit> for u32 {
    fn from(limit: ProductLimit) -> Self {
        limit.0
    }
}
