//! Bearer token authentication extractor.
//!
//! Every route except registration, login and the health checks requires an
//! `Authorization: Bearer <jwt>` header.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use favorites_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Extractor that requires a valid access token.
///
/// Rejects with 401 when the header is missing, malformed, expired or
/// signed with another key.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(auth: RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", auth.user_id())
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub UserId);

impl RequireAuth {
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0
    }

    /// Reject access to resources scoped to another user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if `owner` is not the authenticated user.
    pub fn ensure_owner(&self, owner: UserId) -> Result<(), AppError> {
        if self.0 == owner {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "cannot access another user's resources".to_string(),
            ))
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let claims = state.tokens().verify(token)?;

        tracing::Span::current().record("user_id", tracing::field::display(claims.sub));
        set_sentry_user(&claims.sub);

        Ok(Self(claims.sub))
    }
}
