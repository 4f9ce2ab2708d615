//! In-memory stores and a fake catalog for service tests.
//!
//! [`MemoryStore`] implements every store trait over one shared state so
//! cascades (user -> list -> entries, product -> entries) behave like the
//! database schema.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;

use favorites_core::{
    Email, FavoriteListId, FavoriteProductId, ProductId, ProductLimit, UserId,
};

use crate::catalog::{CatalogError, CatalogSource, UpstreamProduct};
use crate::db::RepositoryError;
use crate::models::favorite::{FavoriteEntry, FavoriteList, FavoriteProduct, NewFavoriteList};
use crate::models::product::{NewProduct, Product, ProductView};
use crate::models::user::{User, UserChanges};
use crate::services::auth::UserStore;
use crate::services::favorites::FavoritesStore;
use crate::services::products::ProductStore;

#[derive(Default)]
struct Data {
    users: Vec<(User, String)>,
    products: Vec<Product>,
    lists: Vec<FavoriteList>,
    entries: Vec<FavoriteProduct>,
    ticks: i64,
}

impl Data {
    /// Strictly increasing timestamps so ordering is deterministic.
    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        DateTime::UNIX_EPOCH + TimeDelta::seconds(self.ticks)
    }

    fn is_favorite(&self, user_id: UserId, product_id: ProductId) -> bool {
        self.lists
            .iter()
            .filter(|l| l.user_id == user_id)
            .any(|l| {
                self.entries
                    .iter()
                    .any(|e| e.favorite_list_id == l.id && e.product_id == product_id)
            })
    }

    fn view(&self, user_id: UserId, product: &Product) -> ProductView {
        ProductView {
            product: product.clone(),
            is_favorite: self.is_favorite(user_id, product.id),
        }
    }

    fn remove_list(&mut self, list_id: FavoriteListId) -> Option<FavoriteList> {
        let index = self.lists.iter().position(|l| l.id == list_id)?;
        self.entries.retain(|e| e.favorite_list_id != list_id);
        Some(self.lists.remove(index))
    }
}

/// Shared in-memory state implementing all store traits.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Data>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    #[allow(clippy::unwrap_used)]
    fn lock(&self) -> MutexGuard<'_, Data> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.data.lock().unwrap()
    }

    /// Number of store operations performed so far (seeding included).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[allow(clippy::unwrap_used)]
    pub fn seed_user(&self, email: &str) -> UserId {
        let mut data = self.lock();
        let now = data.now();
        let user = User {
            id: UserId::random(),
            name: "Test User".to_string(),
            email: Email::parse(email).unwrap(),
            created_at: now,
            updated_at: now,
        };
        let id = user.id;
        data.users.push((user, "not-a-hash".to_string()));
        id
    }

    pub fn seed_product(&self, name: &str) -> ProductId {
        let mut data = self.lock();
        let product = Product {
            id: ProductId::random(),
            name: name.to_string(),
            image: format!("https://img.example.com/{}.jpg", name.to_lowercase()),
            price: Decimal::new(1999, 2),
            created_at: data.now(),
        };
        let id = product.id;
        data.products.push(product);
        id
    }

    pub fn password_hash(&self, id: UserId) -> Option<String> {
        self.lock()
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(_, hash)| hash.clone())
    }

    pub fn list_count(&self, user_id: UserId) -> usize {
        self.lock()
            .lists
            .iter()
            .filter(|l| l.user_id == user_id)
            .count()
    }

    pub fn entry_count(&self, list_id: FavoriteListId) -> usize {
        self.lock()
            .entries
            .iter()
            .filter(|e| e.favorite_list_id == list_id)
            .count()
    }

    pub fn product_count(&self) -> usize {
        self.lock().products.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut data = self.lock();
        if data.users.iter().any(|(u, _)| &u.email == email) {
            return Err(RepositoryError::Conflict("email already registered".to_string()));
        }
        let now = data.now();
        let user = User {
            id: UserId::random(),
            name: name.to_string(),
            email: email.clone(),
            created_at: now,
            updated_at: now,
        };
        data.users.push((user.clone(), password_hash.to_string()));
        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|(u, _)| &u.email == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.lock().users.iter().map(|(u, _)| u.clone()).collect())
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, RepositoryError> {
        let mut data = self.lock();
        if let Some(email) = &changes.email
            && data.users.iter().any(|(u, _)| &u.email == email && u.id != id)
        {
            return Err(RepositoryError::Conflict("email already registered".to_string()));
        }
        let now = data.now();
        let Some((user, hash)) = data.users.iter_mut().find(|(u, _)| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            user.name.clone_from(name);
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(password_hash) = &changes.password_hash {
            hash.clone_from(password_hash);
        }
        user.updated_at = now;
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let mut data = self.lock();
        let Some(index) = data.users.iter().position(|(u, _)| u.id == id) else {
            return Ok(None);
        };
        let list_ids: Vec<_> = data
            .lists
            .iter()
            .filter(|l| l.user_id == id)
            .map(|l| l.id)
            .collect();
        for list_id in list_ids {
            data.remove_list(list_id);
        }
        Ok(Some(data.users.remove(index).0))
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let mut data = self.lock();
        let count = data.users.len() as u64;
        data.users.clear();
        data.lists.clear();
        data.entries.clear();
        Ok(count)
    }
}

#[async_trait]
impl FavoritesStore for MemoryStore {
    async fn user_exists(&self, id: UserId) -> Result<bool, RepositoryError> {
        Ok(self.lock().users.iter().any(|(u, _)| u.id == id))
    }

    async fn product_exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.lock().products.iter().any(|p| p.id == id))
    }

    async fn find_list(&self, user_id: UserId) -> Result<Option<FavoriteList>, RepositoryError> {
        Ok(self
            .lock()
            .lists
            .iter()
            .find(|l| l.user_id == user_id)
            .cloned())
    }

    async fn create_list(&self, list: &NewFavoriteList) -> Result<FavoriteList, RepositoryError> {
        let mut data = self.lock();
        if data.lists.iter().any(|l| l.user_id == list.user_id) {
            return Err(RepositoryError::Conflict("user already has a list".to_string()));
        }
        let created = FavoriteList {
            id: FavoriteListId::random(),
            user_id: list.user_id,
            title: list.title.clone(),
            description: list.description.clone(),
            created_at: data.now(),
        };
        data.lists.push(created.clone());
        Ok(created)
    }

    async fn product_ids(&self, list_id: FavoriteListId) -> Result<Vec<ProductId>, RepositoryError> {
        Ok(self
            .lock()
            .entries
            .iter()
            .filter(|e| e.favorite_list_id == list_id)
            .map(|e| e.product_id)
            .collect())
    }

    async fn entries(&self, list_id: FavoriteListId) -> Result<Vec<FavoriteEntry>, RepositoryError> {
        let data = self.lock();
        data.entries
            .iter()
            .filter(|e| e.favorite_list_id == list_id)
            .map(|e| {
                let product = data
                    .products
                    .iter()
                    .find(|p| p.id == e.product_id)
                    .cloned()
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!("dangling entry {}", e.id))
                    })?;
                Ok(FavoriteEntry {
                    favorite: e.clone(),
                    product,
                })
            })
            .collect()
    }

    async fn insert_entry(
        &self,
        list_id: FavoriteListId,
        product_id: ProductId,
    ) -> Result<FavoriteProduct, RepositoryError> {
        let mut data = self.lock();
        if data
            .entries
            .iter()
            .any(|e| e.favorite_list_id == list_id && e.product_id == product_id)
        {
            return Err(RepositoryError::Conflict("product already in list".to_string()));
        }
        let entry = FavoriteProduct {
            id: FavoriteProductId::random(),
            favorite_list_id: list_id,
            product_id,
            created_at: data.now(),
        };
        data.entries.push(entry.clone());
        Ok(entry)
    }

    async fn delete_entry(
        &self,
        list_id: FavoriteListId,
        product_id: ProductId,
    ) -> Result<Option<FavoriteProduct>, RepositoryError> {
        let mut data = self.lock();
        let index = data
            .entries
            .iter()
            .position(|e| e.favorite_list_id == list_id && e.product_id == product_id);
        Ok(index.map(|i| data.entries.remove(i)))
    }

    async fn delete_list(
        &self,
        list_id: FavoriteListId,
    ) -> Result<Option<FavoriteList>, RepositoryError> {
        Ok(self.lock().remove_list(list_id))
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list(
        &self,
        user_id: UserId,
        limit: ProductLimit,
    ) -> Result<Vec<ProductView>, RepositoryError> {
        let data = self.lock();
        Ok(data
            .products
            .iter()
            .take(limit.as_usize())
            .map(|p| data.view(user_id, p))
            .collect())
    }

    async fn insert_many(&self, products: &[NewProduct]) -> Result<Vec<ProductId>, RepositoryError> {
        let mut data = self.lock();
        let mut ids = Vec::with_capacity(products.len());
        for new in products {
            let product = Product {
                id: ProductId::random(),
                name: new.name.clone(),
                image: new.image.clone(),
                price: new.price,
                created_at: data.now(),
            };
            ids.push(product.id);
            data.products.push(product);
        }
        Ok(ids)
    }

    async fn list_by_ids(
        &self,
        user_id: UserId,
        ids: &[ProductId],
    ) -> Result<Vec<ProductView>, RepositoryError> {
        let data = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| data.products.iter().find(|p| p.id == *id))
            .map(|p| data.view(user_id, p))
            .collect())
    }

    async fn get(
        &self,
        id: ProductId,
        user_id: UserId,
    ) -> Result<Option<ProductView>, RepositoryError> {
        let data = self.lock();
        Ok(data
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| data.view(user_id, p)))
    }

    async fn delete(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let mut data = self.lock();
        let Some(index) = data.products.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        data.entries.retain(|e| e.product_id != id);
        Ok(Some(data.products.remove(index)))
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let mut data = self.lock();
        let count = data.products.len() as u64;
        data.products.clear();
        data.entries.clear();
        Ok(count)
    }
}

/// Catalog double that counts fetches.
#[derive(Clone)]
pub struct FakeCatalog {
    available: usize,
    failing: bool,
    calls: Arc<AtomicUsize>,
}

impl FakeCatalog {
    /// A catalog offering `available` products named `Catalog product {i}`.
    pub fn with_products(available: usize) -> Self {
        Self {
            available,
            failing: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A catalog that always answers 503.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::with_products(0)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn fetch_products(&self, limit: usize) -> Result<Vec<UpstreamProduct>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(CatalogError::Status {
                status: 503,
                body: "maintenance".to_string(),
            });
        }
        Ok((0..self.available.min(limit))
            .map(|i| UpstreamProduct {
                name: format!("Catalog product {i}"),
                image: format!("https://img.example.com/{i}.jpg"),
                price: Decimal::new(1099 + 100 * i64::try_from(i).unwrap_or(0), 2),
            })
            .collect())
    }
}
