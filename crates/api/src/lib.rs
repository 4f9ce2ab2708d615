//! Favorites API library.
//!
//! Accounts, JWT sessions, a local mirror of an upstream product catalog and
//! per-user favorites lists, served over JSON by axum. The binary in
//! `main.rs` wires configuration, tracing and Sentry around [`routes::app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
