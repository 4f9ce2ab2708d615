//! Favorites repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use favorites_core::{FavoriteListId, ProductId, UserId};

use super::RepositoryError;
use crate::models::favorite::{
    FavoriteEntry, FavoriteList, FavoriteProduct, NewFavoriteList,
};
use crate::models::product::Product;
use crate::services::favorites::FavoritesStore;

const LIST_COLUMNS: &str = "id, user_id, title, description, created_at";
const ENTRY_COLUMNS: &str = "id, favorite_list_id, product_id, created_at";

/// A junction row joined with its product.
#[derive(sqlx::FromRow)]
struct EntryRow {
    #[sqlx(flatten)]
    favorite: FavoriteProduct,
    product_name: String,
    product_image: String,
    product_price: Decimal,
    product_created_at: DateTime<Utc>,
}

impl From<EntryRow> for FavoriteEntry {
    fn from(row: EntryRow) -> Self {
        Self {
            product: Product {
                id: row.favorite.product_id,
                name: row.product_name,
                image: row.product_image,
                price: row.product_price,
                created_at: row.product_created_at,
            },
            favorite: row.favorite,
        }
    }
}

/// Repository for favorites lists and their entries.
pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    /// Create a new favorites repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoritesStore for FavoriteRepository<'_> {
    async fn user_exists(&self, id: UserId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    async fn product_exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_list(&self, user_id: UserId) -> Result<Option<FavoriteList>, RepositoryError> {
        let list = sqlx::query_as::<_, FavoriteList>(&format!(
            "SELECT {LIST_COLUMNS} FROM favorite_lists WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(list)
    }

    async fn create_list(&self, list: &NewFavoriteList) -> Result<FavoriteList, RepositoryError> {
        sqlx::query_as::<_, FavoriteList>(&format!(
            "INSERT INTO favorite_lists (user_id, title, description) VALUES ($1, $2, $3) \
             RETURNING {LIST_COLUMNS}"
        ))
        .bind(list.user_id)
        .bind(&list.title)
        .bind(list.description.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "user already has a favorites list"))
    }

    async fn product_ids(&self, list_id: FavoriteListId) -> Result<Vec<ProductId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, ProductId>(
            "SELECT product_id FROM favorite_products WHERE favorite_list_id = $1",
        )
        .bind(list_id)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }

    async fn entries(&self, list_id: FavoriteListId) -> Result<Vec<FavoriteEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r"
            SELECT fp.id, fp.favorite_list_id, fp.product_id, fp.created_at,
                   p.name AS product_name,
                   p.image AS product_image,
                   p.price AS product_price,
                   p.created_at AS product_created_at
            FROM favorite_products fp
            JOIN products p ON p.id = fp.product_id
            WHERE fp.favorite_list_id = $1
            ORDER BY fp.created_at, fp.id
            ",
        )
        .bind(list_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(FavoriteEntry::from).collect())
    }

    async fn insert_entry(
        &self,
        list_id: FavoriteListId,
        product_id: ProductId,
    ) -> Result<FavoriteProduct, RepositoryError> {
        sqlx::query_as::<_, FavoriteProduct>(&format!(
            "INSERT INTO favorite_products (favorite_list_id, product_id) VALUES ($1, $2) \
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(list_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "product already in favorites list"))
    }

    async fn delete_entry(
        &self,
        list_id: FavoriteListId,
        product_id: ProductId,
    ) -> Result<Option<FavoriteProduct>, RepositoryError> {
        let entry = sqlx::query_as::<_, FavoriteProduct>(&format!(
            "DELETE FROM favorite_products WHERE favorite_list_id = $1 AND product_id = $2 \
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(list_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(entry)
    }

    async fn delete_list(
        &self,
        list_id: FavoriteListId,
    ) -> Result<Option<FavoriteList>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM favorite_products WHERE favorite_list_id = $1")
            .bind(list_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let list = sqlx::query_as::<_, FavoriteList>(&format!(
            "DELETE FROM favorite_lists WHERE id = $1 RETURNING {LIST_COLUMNS}"
        ))
        .bind(list_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(list_id = %list_id, removed, "Deleted favorites list entries");
        Ok(list)
    }
}
