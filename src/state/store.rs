use crate::error::Result;
use crate::models::{NewProduct, Product};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Trait for authoritative catalog storage operations
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Check that the store is reachable
    async fn ping(&self) -> Result<()>;

    /// Persist a new record; the store assigns id and timestamps
    async fn create(&self, new: NewProduct) -> Result<Product>;

    /// Get a record by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>>;

    /// Every record, ordered by id ascending
    async fn find_all(&self) -> Result<Vec<Product>>;

    /// One page of records, newest first, together with the total record count
    async fn list_page(&self, offset: u64, limit: u64) -> Result<(Vec<Product>, u64)>;

    /// Overwrite a record; returns the persisted row or `None` if it no longer exists
    async fn update(&self, product: &Product) -> Result<Option<Product>>;

    /// Delete a record; returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Count all records
    async fn count(&self) -> Result<u64>;
}

/// In-memory catalog store (for development and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    products: Arc<DashMap<i64, Product>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            products: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn create(&self, new: NewProduct) -> Result<Product> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let product = Product::from_new(id, new, Utc::now());
        self.products.insert(id, product.clone());

        tracing::debug!(product_id = id, "Product saved");
        Ok(product)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
        Ok(self.products.get(&id).map(|entry| entry.clone()))
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    async fn list_page(&self, offset: u64, limit: u64) -> Result<(Vec<Product>, u64)> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        let total = products.len() as u64;

        // Newest first; id breaks ties between records created in the same instant
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok((
            products
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
            total,
        ))
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>> {
        match self.products.get_mut(&product.id) {
            Some(mut entry) => {
                let mut updated = product.clone();
                updated.created_at = entry.created_at;
                updated.updated_at = Utc::now();
                *entry = updated.clone();
                tracing::debug!(product_id = product.id, "Product updated");
                Ok(Some(updated))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let removed = self.products.remove(&id).is_some();
        if removed {
            tracing::debug!(product_id = id, "Product deleted");
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.products.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            brand: "Nike".to_string(),
            category: "Shoes".to_string(),
            description: None,
            price: 50.0,
            rating: None,
            in_stock: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = InMemoryStore::new();

        let first = store.create(new_product("First")).await.unwrap();
        let second = store.create(new_product("Second")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let store = InMemoryStore::new();
        let mut product = store.create(new_product("Shoe")).await.unwrap();
        let created_at = product.created_at;

        product.name = "Renamed Shoe".to_string();
        product.created_at = Utc::now() + chrono::Duration::days(1);
        let updated = store.update(&product).await.unwrap().unwrap();

        assert_eq!(updated.name, "Renamed Shoe");
        assert_eq!(updated.created_at, created_at);
        assert!(updated.updated_at >= created_at);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = InMemoryStore::new();
        let mut product = store.create(new_product("Shoe")).await.unwrap();
        store.delete(product.id).await.unwrap();

        product.name = "Ghost".to_string();
        assert!(store.update(&product).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_all_ordered_by_id() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store.create(new_product(&format!("P{}", i))).await.unwrap();
        }

        let ids: Vec<i64> = store.find_all().await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_list_page_newest_first() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store.create(new_product(&format!("P{}", i))).await.unwrap();
        }

        let (page, total) = store.list_page(0, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, 5);
        assert_eq!(page[1].id, 4);

        let (last, _) = store.list_page(4, 2).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].id, 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryStore::new();
        let product = store.create(new_product("Shoe")).await.unwrap();

        assert!(store.delete(product.id).await.unwrap());
        assert!(!store.delete(product.id).await.unwrap());
        assert!(store.find_by_id(product.id).await.unwrap().is_none());
    }
}
