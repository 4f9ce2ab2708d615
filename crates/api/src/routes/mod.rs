//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (database ping)
//!
//! # Accounts and sessions
//! POST /accounts               - Register (public)
//! GET  /accounts               - List users
//! ...  /accounts/user/{id}     - Own account
//! POST /sessions               - Login (public)
//!
//! # Favorites (also under /favorite)
//! .../favorites/user/{userId}
//! .../favorites/{userId}/product/{productId}
//! .../favorites/{userId}
//!
//! # Products
//! GET  /products/user/{userId}?limit=N
//! ...  /products/{id}
//! DELETE /products
//! ```
//!
//! Everything except the public routes needs `Authorization: Bearer <jwt>`.
//! Routes scoped to a user id only serve that user.

pub mod accounts;
pub mod favorites;
pub mod health;
pub mod products;
pub mod sessions;

use std::str::FromStr;
use std::time::Duration;

use axum::{
    Router,
    extract::FromRequest,
    extract::FromRequestParts,
    http::{Request, Response},
    middleware::from_fn,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use favorites_core::parse_id;

use crate::error::AppError;
use crate::middleware::{api_rate_limiter, auth_rate_limiter, request_id_middleware};
use crate::state::AppState;

/// JSON body extractor whose rejection is an [`AppError`] (400 with the
/// usual error body).
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Query string extractor whose rejection is an [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// Body of bulk deletes.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: u64,
}

/// Parse an id from the path. Something that isn't a UUID can't name an
/// existing row, so it is a 404.
pub(crate) fn path_id<T: FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    parse_id(raw).ok_or_else(|| AppError::NotFound(format!("{what} not found")))
}

fn routes(rate_limited: bool) -> Router<AppState> {
    // Login and registration share one strict per-IP budget
    let public = Router::new()
        .merge(accounts::registration_router())
        .merge(sessions::router());
    let public = if rate_limited {
        public.layer(auth_rate_limiter())
    } else {
        public
    };

    Router::new()
        .merge(health::router())
        .merge(accounts::router())
        .merge(public)
        .nest("/favorites", favorites::router())
        .nest("/favorite", favorites::router())
        .merge(products::router())
}

fn build(state: AppState, rate_limited: bool) -> Router {
    let router = routes(rate_limited)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .layer(CorsLayer::permissive());

    let router = if rate_limited {
        router.layer(api_rate_limiter())
    } else {
        router
    };

    router
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// The application router without rate limiting.
pub fn app(state: AppState) -> Router {
    build(state, false)
}

/// The application router with per-IP rate limits.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// limiter can key on the peer address.
pub fn rate_limited_app(state: AppState) -> Router {
    build(state, true)
}
