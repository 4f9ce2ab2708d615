//! Account route handlers.
//!
//! ```text
//! POST   /accounts              - Register (public)
//! GET    /accounts              - List users
//! DELETE /accounts              - Delete every user
//! GET    /accounts/user/{id}    - Get own account
//! PUT    /accounts/user/{id}    - Update own account
//! DELETE /accounts/user/{id}    - Delete own account
//! ```

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use favorites_core::UserId;

use super::{Deleted, JsonBody, path_id};
use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::user::User;
use crate::services::auth::{AccountService, AccountUpdate};
use crate::state::AppState;

/// Public registration, kept apart so it can carry the strict rate limit.
pub fn registration_router() -> Router<AppState> {
    Router::new().route("/accounts", post(register))
}

/// Authenticated account maintenance.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list).delete(delete_all))
        .route(
            "/accounts/user/{id}",
            get(show).put(update).delete(delete),
        )
}

/// Registration payload. `passwordHash` is accepted for older clients.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    #[serde(alias = "passwordHash")]
    pub password: String,
}

/// Profile update payload. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "passwordHash")]
    pub password: Option<String>,
}

fn accounts(state: &AppState) -> AccountService<UserRepository<'_>> {
    AccountService::new(UserRepository::new(state.pool()))
}

/// Resolve `{id}` and make sure it is the caller's own account.
fn own_account(auth: RequireAuth, raw_id: &str) -> Result<UserId> {
    let id = path_id(raw_id, "user")?;
    auth.ensure_owner(id)?;
    Ok(id)
}

/// POST /accounts
async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = accounts(&state)
        .register(&req.name, &req.email, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /accounts
async fn list(State(state): State<AppState>, _auth: RequireAuth) -> Result<Json<Vec<User>>> {
    Ok(Json(accounts(&state).list().await?))
}

/// DELETE /accounts
async fn delete_all(State(state): State<AppState>, auth: RequireAuth) -> Result<Json<Deleted>> {
    tracing::warn!(requested_by = %auth.user_id(), "Deleting all accounts");
    let deleted = accounts(&state).delete_all().await?;
    Ok(Json(Deleted { deleted }))
}

/// GET /accounts/user/{id}
async fn show(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    let id = own_account(auth, &id)?;
    Ok(Json(accounts(&state).get(id).await?))
}

/// PUT /accounts/user/{id}
async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateAccountRequest>,
) -> Result<Json<User>> {
    let id = own_account(auth, &id)?;
    let update = AccountUpdate {
        name: req.name,
        email: req.email,
        password: req.password,
    };
    Ok(Json(accounts(&state).update(id, update).await?))
}

/// DELETE /accounts/user/{id}
async fn delete(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    let id = own_account(auth, &id)?;
    Ok(Json(accounts(&state).delete(id).await?))
}
