//! Login.
//!
//! ```text
//! POST /sessions - Exchange email and password for an access token (public)
//! ```

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Deserialize;

use super::JsonBody;
use crate::db::UserRepository;
use crate::error::Result;
use crate::services::auth::{AccountService, Session};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/sessions", post(authenticate))
}

/// Login payload. `passwordHash` is accepted for older clients.
#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    pub email: String,
    #[serde(alias = "passwordHash")]
    pub password: String,
}

/// POST /sessions
///
/// Responds with `{"access_token": ..., "user": {...}}`.
async fn authenticate(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AuthenticateRequest>,
) -> Result<(StatusCode, Json<Session>)> {
    let session = AccountService::new(UserRepository::new(state.pool()))
        .authenticate(&req.email, &req.password, state.tokens())
        .await?;

    tracing::info!(user_id = %session.user.id, "User logged in");
    Ok((StatusCode::CREATED, Json(session)))
}
