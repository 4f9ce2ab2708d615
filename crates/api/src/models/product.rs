//! Product catalog types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use favorites_core::ProductId;

use crate::catalog::UpstreamProduct;

/// A mirrored catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A product annotated with whether the requesting user favorited it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub product: Product,
    pub is_favorite: bool,
}

/// A product about to be written to the mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub image: String,
    pub price: Decimal,
}

impl From<UpstreamProduct> for NewProduct {
    fn from(p: UpstreamProduct) -> Self {
        Self {
            name: p.name,
            image: p.image,
            price: p.price,
        }
    }
}
