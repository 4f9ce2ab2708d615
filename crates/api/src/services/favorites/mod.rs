//! Favorites service.
//!
//! Each user owns at most one favorites list, and a list holds at most
//! [`favorites_core::FAVORITES_CAPACITY`] distinct products. Uniqueness is
//! also enforced by database constraints; the capacity check is
//! check-then-act and is not guarded against concurrent adds for the same
//! user.

mod error;

pub use error::FavoritesError;

use async_trait::async_trait;

use favorites_core::{FavoriteListId, ProductId, UserId, admit};

use crate::db::RepositoryError;
use crate::models::favorite::{
    FavoriteEntry, FavoriteList, FavoriteListWithProducts, FavoriteProduct, NewFavoriteList,
};

/// Maximum list title length (matches the column).
const MAX_TITLE_LENGTH: usize = 255;

/// Persistence for favorites lists and their entries.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    async fn user_exists(&self, id: UserId) -> Result<bool, RepositoryError>;

    async fn product_exists(&self, id: ProductId) -> Result<bool, RepositoryError>;

    async fn find_list(&self, user_id: UserId) -> Result<Option<FavoriteList>, RepositoryError>;

    /// Insert a list. A second list for the same user is
    /// [`RepositoryError::Conflict`].
    async fn create_list(&self, list: &NewFavoriteList) -> Result<FavoriteList, RepositoryError>;

    /// Product ids currently in the list.
    async fn product_ids(&self, list_id: FavoriteListId) -> Result<Vec<ProductId>, RepositoryError>;

    /// Entries of the list with their products, oldest first.
    async fn entries(&self, list_id: FavoriteListId) -> Result<Vec<FavoriteEntry>, RepositoryError>;

    /// Insert an entry. A duplicate pair is [`RepositoryError::Conflict`].
    async fn insert_entry(
        &self,
        list_id: FavoriteListId,
        product_id: ProductId,
    ) -> Result<FavoriteProduct, RepositoryError>;

    async fn delete_entry(
        &self,
        list_id: FavoriteListId,
        product_id: ProductId,
    ) -> Result<Option<FavoriteProduct>, RepositoryError>;

    /// Delete a list and all of its entries atomically.
    async fn delete_list(
        &self,
        list_id: FavoriteListId,
    ) -> Result<Option<FavoriteList>, RepositoryError>;
}

/// Favorites service.
pub struct FavoritesService<S> {
    store: S,
}

impl<S: FavoritesStore> FavoritesService<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Create the user's favorites list.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::InvalidTitle` for a blank title,
    /// `FavoritesError::UserNotFound` if the user doesn't exist and
    /// `FavoritesError::ListAlreadyExists` if they already own a list.
    pub async fn create_list(
        &self,
        user_id: UserId,
        title: &str,
        description: Option<&str>,
    ) -> Result<FavoriteList, FavoritesError> {
        let title = validate_title(title)?;

        if !self.store.user_exists(user_id).await? {
            return Err(FavoritesError::UserNotFound);
        }
        if self.store.find_list(user_id).await?.is_some() {
            return Err(FavoritesError::ListAlreadyExists);
        }

        let new_list = NewFavoriteList {
            user_id,
            title,
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        };

        let list = self
            .store
            .create_list(&new_list)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => FavoritesError::ListAlreadyExists,
                other => FavoritesError::Repository(other),
            })?;

        tracing::info!(user_id = %user_id, list_id = %list.id, "Created favorites list");
        Ok(list)
    }

    /// Add a product to the user's list.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::UserNotFound`, `FavoritesError::ProductNotFound`
    /// or `FavoritesError::ListNotFound` for missing entities,
    /// `FavoritesError::LimitExceeded` when the list is full and
    /// `FavoritesError::AlreadyFavorited` when the product is already in it.
    pub async fn add_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<FavoriteProduct, FavoritesError> {
        if !self.store.user_exists(user_id).await? {
            return Err(FavoritesError::UserNotFound);
        }
        if !self.store.product_exists(product_id).await? {
            return Err(FavoritesError::ProductNotFound);
        }
        let list = self
            .store
            .find_list(user_id)
            .await?
            .ok_or(FavoritesError::ListNotFound)?;

        let current = self.store.product_ids(list.id).await?;
        admit(&current, product_id)?;

        let entry = self
            .store
            .insert_entry(list.id, product_id)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => FavoritesError::AlreadyFavorited(product_id),
                other => FavoritesError::Repository(other),
            })?;

        tracing::debug!(list_id = %list.id, product_id = %product_id, "Added favorite");
        Ok(entry)
    }

    /// The user's list with every entry's product.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::ListNotFound` if the user has no list.
    pub async fn list_favorites(
        &self,
        user_id: UserId,
    ) -> Result<FavoriteListWithProducts, FavoritesError> {
        let list = self
            .store
            .find_list(user_id)
            .await?
            .ok_or(FavoritesError::ListNotFound)?;
        let favorite_products = self.store.entries(list.id).await?;

        Ok(FavoriteListWithProducts {
            list,
            favorite_products,
        })
    }

    /// Remove a product from the user's list, returning the removed entry.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::ListNotFound` if the user has no list and
    /// `FavoritesError::NotInList` if the product isn't in it.
    pub async fn remove_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<FavoriteProduct, FavoritesError> {
        let list = self
            .store
            .find_list(user_id)
            .await?
            .ok_or(FavoritesError::ListNotFound)?;

        self.store
            .delete_entry(list.id, product_id)
            .await?
            .ok_or(FavoritesError::NotInList)
    }

    /// Delete the user's list and its entries, returning the deleted list.
    ///
    /// # Errors
    ///
    /// Returns `FavoritesError::ListNotFound` if the user has no list.
    pub async fn delete_list(&self, user_id: UserId) -> Result<FavoriteList, FavoritesError> {
        let list = self
            .store
            .find_list(user_id)
            .await?
            .ok_or(FavoritesError::ListNotFound)?;

        let deleted = self
            .store
            .delete_list(list.id)
            .await?
            .ok_or(FavoritesError::ListNotFound)?;

        tracing::info!(user_id = %user_id, list_id = %deleted.id, "Deleted favorites list");
        Ok(deleted)
    }
}

fn validate_title(title: &str) -> Result<String, FavoritesError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(FavoritesError::InvalidTitle(
            "title cannot be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(FavoritesError::InvalidTitle(format!(
            "title cannot be longer than {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(title.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use favorites_core::FAVORITES_CAPACITY;

    use super::*;
    use crate::services::testing::MemoryStore;

    fn service() -> (FavoritesService<MemoryStore>, MemoryStore) {
        let store = MemoryStore::default();
        (FavoritesService::new(store.clone()), store)
    }

    async fn user_with_list(
        favorites: &FavoritesService<MemoryStore>,
        store: &MemoryStore,
    ) -> (UserId, FavoriteList) {
        let user = store.seed_user("ada@example.com");
        let list = favorites
            .create_list(user, "Wishlist", Some("things I want"))
            .await
            .unwrap();
        (user, list)
    }

    #[tokio::test]
    async fn test_user_never_owns_two_lists() {
        let (favorites, store) = service();
        let (user, list) = user_with_list(&favorites, &store).await;
        assert_eq!(list.user_id, user);
        assert_eq!(list.description.as_deref(), Some("things I want"));

        let err = favorites
            .create_list(user, "Second", None)
            .await
            .unwrap_err();
        assert!(matches!(err, FavoritesError::ListAlreadyExists));
        assert_eq!(store.list_count(user), 1);
    }

    #[tokio::test]
    async fn test_create_list_requires_user_and_title() {
        let (favorites, store) = service();

        assert!(matches!(
            favorites.create_list(UserId::random(), "Wishlist", None).await,
            Err(FavoritesError::UserNotFound)
        ));

        let user = store.seed_user("ada@example.com");
        assert!(matches!(
            favorites.create_list(user, "   ", None).await,
            Err(FavoritesError::InvalidTitle(_))
        ));
        assert_eq!(store.list_count(user), 0);
    }

    #[tokio::test]
    async fn test_list_never_exceeds_capacity() {
        let (favorites, store) = service();
        let (user, list) = user_with_list(&favorites, &store).await;

        for i in 0..FAVORITES_CAPACITY {
            let product = store.seed_product(&format!("Product {i}"));
            favorites.add_product(user, product).await.unwrap();
        }

        let extra = store.seed_product("One too many");
        let err = favorites.add_product(user, extra).await.unwrap_err();
        assert!(matches!(
            err,
            FavoritesError::LimitExceeded {
                capacity: FAVORITES_CAPACITY
            }
        ));
        assert_eq!(store.entry_count(list.id), FAVORITES_CAPACITY);
    }

    #[tokio::test]
    async fn test_duplicate_is_rejected_without_side_effects() {
        let (favorites, store) = service();
        let (user, list) = user_with_list(&favorites, &store).await;
        let product = store.seed_product("Backpack");

        let first = favorites.add_product(user, product).await.unwrap();
        assert_eq!(first.favorite_list_id, list.id);
        assert_eq!(first.product_id, product);

        let err = favorites.add_product(user, product).await.unwrap_err();
        assert!(matches!(err, FavoritesError::AlreadyFavorited(id) if id == product));
        assert_eq!(store.entry_count(list.id), 1);
    }

    #[tokio::test]
    async fn test_capacity_is_checked_before_duplicates() {
        let (favorites, store) = service();
        let (user, _) = user_with_list(&favorites, &store).await;

        let products: Vec<_> = (0..FAVORITES_CAPACITY)
            .map(|i| store.seed_product(&format!("Product {i}")))
            .collect();
        for product in &products {
            favorites.add_product(user, *product).await.unwrap();
        }

        let err = favorites.add_product(user, products[0]).await.unwrap_err();
        assert!(matches!(err, FavoritesError::LimitExceeded { .. }));
    }

    #[tokio::test]
    async fn test_add_product_reports_missing_entities() {
        let (favorites, store) = service();
        let user = store.seed_user("ada@example.com");
        let product = store.seed_product("Backpack");

        assert!(matches!(
            favorites.add_product(UserId::random(), product).await,
            Err(FavoritesError::UserNotFound)
        ));
        assert!(matches!(
            favorites.add_product(user, ProductId::random()).await,
            Err(FavoritesError::ProductNotFound)
        ));
        assert!(matches!(
            favorites.add_product(user, product).await,
            Err(FavoritesError::ListNotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_favorites_nests_products() {
        let (favorites, store) = service();
        let (user, list) = user_with_list(&favorites, &store).await;
        let backpack = store.seed_product("Backpack");
        let jacket = store.seed_product("Jacket");
        favorites.add_product(user, backpack).await.unwrap();
        favorites.add_product(user, jacket).await.unwrap();

        let listed = favorites.list_favorites(user).await.unwrap();
        assert_eq!(listed.list, list);
        let names: Vec<_> = listed
            .favorite_products
            .iter()
            .map(|e| e.product.name.as_str())
            .collect();
        assert_eq!(names, ["Backpack", "Jacket"]);
        assert!(
            listed
                .favorite_products
                .iter()
                .all(|e| e.favorite.product_id == e.product.id)
        );
    }

    #[tokio::test]
    async fn test_list_favorites_without_list_is_not_found() {
        let (favorites, store) = service();
        let user = store.seed_user("ada@example.com");
        assert!(matches!(
            favorites.list_favorites(user).await,
            Err(FavoritesError::ListNotFound)
        ));
    }

    #[tokio::test]
    async fn test_remove_product_returns_removed_entry() {
        let (favorites, store) = service();
        let (user, list) = user_with_list(&favorites, &store).await;
        let product = store.seed_product("Backpack");
        let added = favorites.add_product(user, product).await.unwrap();

        let removed = favorites.remove_product(user, product).await.unwrap();
        assert_eq!(removed, added);
        assert_eq!(store.entry_count(list.id), 0);

        assert!(matches!(
            favorites.remove_product(user, product).await,
            Err(FavoritesError::NotInList)
        ));
    }

    #[tokio::test]
    async fn test_delete_list_removes_entries() {
        let (favorites, store) = service();
        let (user, list) = user_with_list(&favorites, &store).await;
        for i in 0..3 {
            let product = store.seed_product(&format!("Product {i}"));
            favorites.add_product(user, product).await.unwrap();
        }

        let deleted = favorites.delete_list(user).await.unwrap();
        assert_eq!(deleted, list);
        assert_eq!(store.entry_count(list.id), 0);
        assert_eq!(store.list_count(user), 0);

        assert!(matches!(
            favorites.delete_list(user).await,
            Err(FavoritesError::ListNotFound)
        ));
        // A fresh list can be created afterwards.
        favorites.create_list(user, "Again", None).await.unwrap();
    }

    /// Commits a competing write between the service's check and its own
    /// write, the way a concurrent request for the same user would.
    struct RacingStore(MemoryStore);

    #[async_trait]
    impl FavoritesStore for RacingStore {
        async fn user_exists(&self, id: UserId) -> Result<bool, RepositoryError> {
            self.0.user_exists(id).await
        }

        async fn product_exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
            self.0.product_exists(id).await
        }

        async fn find_list(
            &self,
            user_id: UserId,
        ) -> Result<Option<FavoriteList>, RepositoryError> {
            self.0.find_list(user_id).await
        }

        async fn create_list(
            &self,
            list: &NewFavoriteList,
        ) -> Result<FavoriteList, RepositoryError> {
            self.0.create_list(list).await?;
            self.0.create_list(list).await
        }

        async fn product_ids(
            &self,
            list_id: FavoriteListId,
        ) -> Result<Vec<ProductId>, RepositoryError> {
            self.0.product_ids(list_id).await
        }

        async fn entries(
            &self,
            list_id: FavoriteListId,
        ) -> Result<Vec<FavoriteEntry>, RepositoryError> {
            self.0.entries(list_id).await
        }

        async fn insert_entry(
            &self,
            list_id: FavoriteListId,
            product_id: ProductId,
        ) -> Result<FavoriteProduct, RepositoryError> {
            self.0.insert_entry(list_id, product_id).await?;
            self.0.insert_entry(list_id, product_id).await
        }

        async fn delete_entry(
            &self,
            list_id: FavoriteListId,
            product_id: ProductId,
        ) -> Result<Option<FavoriteProduct>, RepositoryError> {
            self.0.delete_entry(list_id, product_id).await
        }

        async fn delete_list(
            &self,
            list_id: FavoriteListId,
        ) -> Result<Option<FavoriteList>, RepositoryError> {
            self.0.delete_list(list_id).await
        }
    }

    #[tokio::test]
    async fn test_store_conflicts_map_to_domain_errors() {
        let store = MemoryStore::default();
        let favorites = FavoritesService::new(RacingStore(store.clone()));
        let user = store.seed_user("ada@example.com");
        let product = store.seed_product("Lamp");

        let err = favorites
            .create_list(user, "Wishlist", None)
            .await
            .unwrap_err();
        assert!(matches!(err, FavoritesError::ListAlreadyExists));
        assert_eq!(store.list_count(user), 1);

        let err = favorites.add_product(user, product).await.unwrap_err();
        assert!(matches!(err, FavoritesError::AlreadyFavorited(id) if id == product));
        let list = store.find_list(user).await.unwrap().unwrap();
        assert_eq!(store.entry_count(list.id), 1);
    }
}
