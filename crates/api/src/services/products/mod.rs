//! Product mirror.
//!
//! Products are served from the local `products` table. When the table is
//! empty the first page is fetched from the upstream catalog, persisted and
//! served from there on. Every product is annotated with whether the
//! requesting user has it in their favorites list.

mod error;

pub use error::ProductError;

use async_trait::async_trait;

use favorites_core::{ProductId, ProductLimit, UserId};

use crate::catalog::CatalogSource;
use crate::db::RepositoryError;
use crate::models::product::{NewProduct, Product, ProductView};

/// Persistence for mirrored products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Up to `limit` stored products, oldest first, annotated for `user_id`.
    async fn list(
        &self,
        user_id: UserId,
        limit: ProductLimit,
    ) -> Result<Vec<ProductView>, RepositoryError>;

    /// Insert products, returning their ids in input order.
    async fn insert_many(&self, products: &[NewProduct]) -> Result<Vec<ProductId>, RepositoryError>;

    /// Products with the given ids, in the same order, annotated for `user_id`.
    async fn list_by_ids(
        &self,
        user_id: UserId,
        ids: &[ProductId],
    ) -> Result<Vec<ProductView>, RepositoryError>;

    async fn get(
        &self,
        id: ProductId,
        user_id: UserId,
    ) -> Result<Option<ProductView>, RepositoryError>;

    /// Delete a product (cascading to favorites entries).
    async fn delete(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn delete_all(&self) -> Result<u64, RepositoryError>;
}

/// Product mirror service.
pub struct ProductMirror<S, C> {
    store: S,
    catalog: C,
}

impl<S: ProductStore, C: CatalogSource> ProductMirror<S, C> {
    #[must_use]
    pub const fn new(store: S, catalog: C) -> Self {
        Self { store, catalog }
    }

    /// List products for `user_id`, populating the mirror on first use.
    ///
    /// The limit is validated before anything else happens.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::InvalidLimit` if `limit` exceeds
    /// [`ProductLimit::MAX`] and `ProductError::Upstream` if the catalog
    /// has to be consulted and fails.
    pub async fn get_products(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<ProductView>, ProductError> {
        let limit = limit.map_or(Ok(ProductLimit::DEFAULT), ProductLimit::new)?;
        if limit.get() == 0 {
            return Ok(Vec::new());
        }

        let stored = self.store.list(user_id, limit).await?;
        if !stored.is_empty() {
            return Ok(stored);
        }

        let fetched: Vec<NewProduct> = self
            .catalog
            .fetch_products(limit.as_usize())
            .await?
            .into_iter()
            .map(NewProduct::from)
            .collect();

        let ids = self.store.insert_many(&fetched).await?;
        tracing::info!(count = ids.len(), "Mirrored products from catalog");

        Ok(self.store.list_by_ids(user_id, &ids).await?)
    }

    /// A single product annotated for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if the product doesn't exist.
    pub async fn get_product(
        &self,
        id: ProductId,
        user_id: UserId,
    ) -> Result<ProductView, ProductError> {
        self.store
            .get(id, user_id)
            .await?
            .ok_or(ProductError::NotFound)
    }

    /// Delete a product, returning it.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if the product doesn't exist.
    pub async fn delete_product(&self, id: ProductId) -> Result<Product, ProductError> {
        self.store.delete(id).await?.ok_or(ProductError::NotFound)
    }

    /// Empty the mirror. The next listing refetches from upstream.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` if the database operation fails.
    pub async fn delete_all_products(&self) -> Result<u64, ProductError> {
        let count = self.store.delete_all().await?;
        tracing::warn!(count, "Cleared product mirror");
        Ok(count)
    }
}
