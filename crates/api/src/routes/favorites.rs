//! Favorites list route handlers.
//!
//! Mounted under both `/favorites` and `/favorite`:
//!
//! ```text
//! POST   /user/{userId}                   - Create the list
//! GET    /user/{userId}                   - List with nested products
//! POST   /{userId}/product/{productId}    - Add a product
//! DELETE /{userId}/product/{productId}    - Remove a product
//! DELETE /{userId}                        - Delete the list
//! ```

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::Deserialize;

use favorites_core::{ProductId, UserId};

use super::{JsonBody, path_id};
use crate::db::FavoriteRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::favorite::{FavoriteList, FavoriteListWithProducts, FavoriteProduct};
use crate::services::favorites::FavoritesService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/{user_id}", get(show).post(create))
        .route(
            "/{user_id}/product/{product_id}",
            post(add_product).delete(remove_product),
        )
        .route("/{user_id}", delete(delete_list))
}

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub title: String,
    pub description: Option<String>,
}

fn favorites(state: &AppState) -> FavoritesService<FavoriteRepository<'_>> {
    FavoritesService::new(FavoriteRepository::new(state.pool()))
}

fn owner(auth: RequireAuth, raw_id: &str) -> Result<UserId> {
    let id = path_id(raw_id, "user")?;
    auth.ensure_owner(id)?;
    Ok(id)
}

/// POST /favorites/user/{userId}
async fn create(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(user_id): Path<String>,
    JsonBody(req): JsonBody<CreateListRequest>,
) -> Result<(StatusCode, Json<FavoriteList>)> {
    let user_id = owner(auth, &user_id)?;
    let list = favorites(&state)
        .create_list(user_id, &req.title, req.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// GET /favorites/user/{userId}
async fn show(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(user_id): Path<String>,
) -> Result<Json<FavoriteListWithProducts>> {
    let user_id = owner(auth, &user_id)?;
    Ok(Json(favorites(&state).list_favorites(user_id).await?))
}

/// POST /favorites/{userId}/product/{productId}
async fn add_product(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path((user_id, product_id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<FavoriteProduct>)> {
    let user_id = owner(auth, &user_id)?;
    let product_id: ProductId = path_id(&product_id, "product")?;
    let entry = favorites(&state).add_product(user_id, product_id).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /favorites/{userId}/product/{productId}
async fn remove_product(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path((user_id, product_id)): Path<(String, String)>,
) -> Result<Json<FavoriteProduct>> {
    let user_id = owner(auth, &user_id)?;
    let product_id: ProductId = path_id(&product_id, "product")?;
    Ok(Json(
        favorites(&state).remove_product(user_id, product_id).await?,
    ))
}

/// DELETE /favorites/{userId}
async fn delete_list(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(user_id): Path<String>,
) -> Result<Json<FavoriteList>> {
    let user_id = owner(auth, &user_id)?;
    Ok(Json(favorites(&state).delete_list(user_id).await?))
}
