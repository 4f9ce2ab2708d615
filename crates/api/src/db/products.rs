//! Product mirror repository for database operations.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use favorites_core::{ProductId, ProductLimit, UserId};

use super::RepositoryError;
use crate::models::product::{NewProduct, Product, ProductView};
use crate::services::products::ProductStore;

const PRODUCT_COLUMNS: &str = "id, name, image, price, created_at";

/// Product columns plus `is_favorite` for the user bound as `$1`.
const VIEW_SELECT: &str = r"
    SELECT p.id, p.name, p.image, p.price, p.created_at,
           EXISTS (
               SELECT 1
               FROM favorite_products fp
               JOIN favorite_lists fl ON fl.id = fp.favorite_list_id
               WHERE fl.user_id = $1 AND fp.product_id = p.id
           ) AS is_favorite
    FROM products p
";

/// Repository for mirrored products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for ProductRepository<'_> {
    async fn list(
        &self,
        user_id: UserId,
        limit: ProductLimit,
    ) -> Result<Vec<ProductView>, RepositoryError> {
        let products = sqlx::query_as::<_, ProductView>(&format!(
            "{VIEW_SELECT} ORDER BY p.created_at, p.id LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit.as_i64())
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    async fn insert_many(&self, products: &[NewProduct]) -> Result<Vec<ProductId>, RepositoryError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO products (name, image, price) ");
        builder.push_values(products, |mut row, product| {
            row.push_bind(&product.name)
                .push_bind(&product.image)
                .push_bind(product.price);
        });
        builder.push(" RETURNING id");

        let ids = builder
            .build_query_scalar::<ProductId>()
            .fetch_all(self.pool)
            .await?;
        Ok(ids)
    }

    async fn list_by_ids(
        &self,
        user_id: UserId,
        ids: &[ProductId],
    ) -> Result<Vec<ProductView>, RepositoryError> {
        let products = sqlx::query_as::<_, ProductView>(&format!(
            "{VIEW_SELECT} WHERE p.id = ANY($2) ORDER BY array_position($2, p.id)"
        ))
        .bind(user_id)
        .bind(ids)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    async fn get(
        &self,
        id: ProductId,
        user_id: UserId,
    ) -> Result<Option<ProductView>, RepositoryError> {
        let product = sqlx::query_as::<_, ProductView>(&format!("{VIEW_SELECT} WHERE p.id = $2"))
            .bind(user_id)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    async fn delete(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM products")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
