//! Capacity and uniqueness rules for a user's favorites list.
//!
//! A list holds at most [`FAVORITES_CAPACITY`] products and never the same
//! product twice. The rules are checked against the list's current contents
//! before anything is written, in this order: capacity first, then
//! duplicates. A full list therefore reports [`AdmitError::Full`] even when
//! the candidate is already in it.

use crate::types::id::ProductId;

/// Maximum number of products a favorites list can hold.
pub const FAVORITES_CAPACITY: usize = 5;

/// Why a product cannot be added to a favorites list.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitError {
    #[error("favorites list is full ({capacity} products)")]
    Full { capacity: usize },
    #[error("product {0} is already in the favorites list")]
    Duplicate(ProductId),
}

/// Check whether `candidate` may join a list currently holding `current`.
///
/// # Errors
///
/// Returns [`AdmitError::Full`] when the list is at capacity and
/// [`AdmitError::Duplicate`] when the product is already present.
pub fn admit(current: &[ProductId], candidate: ProductId) -> Result<(), AdmitError> {
    if current.len() >= FAVORITES_CAPACITY {
        return Err(AdmitError::Full {
            capacity: FAVORITES_CAPACITY,
        });
    }
    if current.contains(&candidate) {
        return Err(AdmitError::Duplicate(candidate));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<ProductId> {
        (0..n).map(|_| ProductId::random()).collect()
    }

    #[test]
    fn test_admits_into_empty_list() {
        assert_eq!(admit(&[], ProductId::random()), Ok(()));
    }

    #[test]
    fn test_admits_fifth_product() {
        assert_eq!(admit(&ids(4), ProductId::random()), Ok(()));
    }

    #[test]
    fn test_rejects_sixth_product() {
        assert_eq!(
            admit(&ids(5), ProductId::random()),
            Err(AdmitError::Full { capacity: 5 })
        );
    }

    #[test]
    fn test_rejects_duplicate() {
        let current = ids(3);
        let again = current[1];
        assert_eq!(admit(&current, again), Err(AdmitError::Duplicate(again)));
    }

    #[test]
    fn test_capacity_checked_before_duplicates() {
        let current = ids(5);
        let again = current[0];
        assert!(matches!(admit(&current, again), Err(AdmitError::Full { .. })));
    }
}
