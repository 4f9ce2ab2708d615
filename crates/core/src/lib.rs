//! Favorites Core - Shared types library.
//!
//! This crate provides the domain types used across the Favorites API components:
//! - `api` - HTTP server for accounts, sessions, products and favorites
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database access,
//! no HTTP clients. The favorites capacity rule lives here so it can be
//! checked (and tested) without a store.
//!
//! # Modules
//!
//! - [`types`] - Typed UUID ids, emails, catalog page limits and the favorites admission rule

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
