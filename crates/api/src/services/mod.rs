//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Accounts: registration, password login, profile maintenance
//! - `favorites` - One favorites list per user, capped at five products
//! - `products` - Local mirror of the upstream product catalog
//! - `token` - JWT access tokens
//!
//! Services are generic over store traits; handlers plug in the Postgres
//! repositories from [`crate::db`].

pub mod auth;
pub mod favorites;
pub mod products;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;
