use crate::error::Result;
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::search::{IndexManager, IndexSync, ReconciliationReport, Reconciler, Synced};
use crate::state::CatalogStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// Page size for catalog listings when none is requested
pub const DEFAULT_LIST_LIMIT: u64 = 10;

/// Hard cap on catalog listing page size
pub const MAX_LIST_LIMIT: u64 = 100;

/// One page of catalog records, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductList {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub items: Vec<Product>,
}

/// Catalog write path: store first, then the search index.
///
/// A store failure fails the call. An index failure after a successful store
/// write only attaches a warning to the returned [`Synced`] value.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    sync: IndexSync,
    reconciler: Reconciler,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, indices: IndexManager) -> Self {
        Self {
            sync: IndexSync::new(indices.clone()),
            reconciler: Reconciler::new(store.clone(), indices),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn CatalogStore> {
        &self.store
    }

    /// Create a record and index it
    pub async fn create_record(&self, new: NewProduct) -> Result<Synced<Product>> {
        let new = new.normalized();
        new.validate()?;

        let product = self.store.create(new).await?;
        info!(product_id = product.id, "Product created");

        let warning = self.sync.on_create(&product).await;
        Ok(Synced::new(product, warning))
    }

    /// Apply a partial update and re-index the full record.
    ///
    /// Returns `None` when no record has this id.
    pub async fn update_record(&self, id: i64, update: ProductUpdate) -> Result<Option<Synced<Product>>> {
        let update = update.normalized();
        update.validate()?;

        let Some(mut product) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };
        product.apply(update);

        let Some(saved) = self.store.update(&product).await? else {
            return Ok(None);
        };
        info!(product_id = id, "Product updated");

        let warning = self.sync.on_update(&saved).await;
        Ok(Some(Synced::new(saved, warning)))
    }

    /// Delete a record and its document. Returns `None` when no record has this id.
    pub async fn delete_record(&self, id: i64) -> Result<Option<Synced<()>>> {
        if !self.store.delete(id).await? {
            return Ok(None);
        }
        info!(product_id = id, "Product deleted");

        let warning = self.sync.on_delete(id).await;
        Ok(Some(Synced::new((), warning)))
    }

    pub async fn get_record(&self, id: i64) -> Result<Option<Product>> {
        self.store.find_by_id(id).await
    }

    /// List records newest first; `0` for page or limit means the default
    pub async fn list_records(&self, page: u64, limit: u64) -> Result<ProductList> {
        let page = page.max(1);
        let limit = match limit {
            0 => DEFAULT_LIST_LIMIT,
            limit => limit.min(MAX_LIST_LIMIT),
        };

        let (items, total) = self.store.list_page((page - 1).saturating_mul(limit), limit).await?;

        Ok(ProductList {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
            items,
        })
    }

    /// Rebuild the search index from the store
    pub async fn reindex_all(&self) -> Result<ReconciliationReport> {
        self.reconciler.rebuild_all().await
    }
}
