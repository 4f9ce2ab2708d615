//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. Rate limiting (governor), only when served by the binary
//! 3. CORS
//! 4. `TraceLayer` (request span with `request_id` and `user_id` fields)
//! 5. Request ID (reuse or generate `x-request-id`)
//!
//! Authentication is an extractor ([`RequireAuth`]) rather than a layer so
//! public routes need no special casing.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::RequireAuth;
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
