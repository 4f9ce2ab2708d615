//! Favorites list types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use favorites_core::{FavoriteListId, FavoriteProductId, ProductId, UserId};

use super::Product;

/// A user's favorites list (at most one per user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteList {
    pub id: FavoriteListId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Junction row linking a list to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteProduct {
    pub id: FavoriteProductId,
    pub favorite_list_id: FavoriteListId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}

/// A junction row together with the product it points to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    #[serde(flatten)]
    pub favorite: FavoriteProduct,
    pub product: Product,
}

/// A list with its nested products, as returned by `GET /favorites/user/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteListWithProducts {
    #[serde(flatten)]
    pub list: FavoriteList,
    pub favorite_products: Vec<FavoriteEntry>,
}

/// Parameters for creating a favorites list.
#[derive(Debug, Clone)]
pub struct NewFavoriteList {
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
}
