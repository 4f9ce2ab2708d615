//! Domain types for the Favorites API.
//!
//! This module provides type-safe wrappers and pure rules for common domain concepts.

pub mod email;
pub mod favorites;
pub mod id;
pub mod limit;

pub use email::{Email, EmailError};
pub use favorites::{AdmitError, FAVORITES_CAPACITY, admit};
pub use id::*;
pub use limit::{LimitError, ProductLimit};
