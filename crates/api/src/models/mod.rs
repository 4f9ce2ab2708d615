//! Domain models for the Favorites API.
//!
//! These are the shapes returned to clients (camelCase JSON) and read back
//! from `PostgreSQL`. Password hashes never appear in any of them.

pub mod favorite;
pub mod product;
pub mod user;

pub use favorite::{FavoriteEntry, FavoriteList, FavoriteListWithProducts, FavoriteProduct, NewFavoriteList};
pub use product::{NewProduct, Product, ProductView};
pub use user::{User, UserChanges};
