//! Product mirror route handlers.
//!
//! ```text
//! GET    /products/user/{userId}?limit=N - Products annotated for the user
//! GET    /products/{id}                  - One product annotated for the caller
//! DELETE /products/{id}                  - Delete one product
//! DELETE /products                       - Empty the mirror
//! ```

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use serde::Deserialize;

use favorites_core::ProductId;

use super::{Deleted, QueryParams, path_id};
use crate::catalog::CatalogClient;
use crate::db::ProductRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::product::{Product, ProductView};
use crate::services::products::ProductMirror;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", delete(delete_all))
        .route("/products/user/{user_id}", get(list))
        .route("/products/{id}", get(show).delete(delete_one))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub limit: Option<u32>,
}

fn mirror(state: &AppState) -> ProductMirror<ProductRepository<'_>, CatalogClient> {
    ProductMirror::new(ProductRepository::new(state.pool()), state.catalog().clone())
}

/// GET /products/user/{userId}?limit=N
async fn list(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(user_id): Path<String>,
    QueryParams(query): QueryParams<ProductsQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let user_id = path_id(&user_id, "user")?;
    auth.ensure_owner(user_id)?;
    Ok(Json(mirror(&state).get_products(user_id, query.limit).await?))
}

/// GET /products/{id}
async fn show(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<ProductView>> {
    let id: ProductId = path_id(&id, "product")?;
    Ok(Json(mirror(&state).get_product(id, auth.user_id()).await?))
}

/// DELETE /products/{id}
async fn delete_one(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id: ProductId = path_id(&id, "product")?;
    Ok(Json(mirror(&state).delete_product(id).await?))
}

/// DELETE /products
async fn delete_all(State(state): State<AppState>, _auth: RequireAuth) -> Result<Json<Deleted>> {
    let deleted = mirror(&state).delete_all_products().await?;
    Ok(Json(Deleted { deleted }))
}
