//! Write-through propagation of catalog mutations into the search index
//!
//! Every operation here runs after the catalog store has committed. A failed
//! index write never turns into an error: it comes back as a [`SyncWarning`]
//! the caller attaches to its otherwise successful response.

use crate::models::Product;
use crate::search::document::ProductDocument;
use crate::search::error::SearchResult;
use crate::search::index::IndexManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error};

/// Catalog mutation a warning refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Created,
    Updated,
    Deleted,
}

impl SyncAction {
    fn verb(&self) -> &'static str {
        match self {
            SyncAction::Created => "created",
            SyncAction::Updated => "updated",
            SyncAction::Deleted => "deleted",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Advisory message telling the operator to run a reindex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncWarning(String);

impl SyncWarning {
    pub fn for_action(action: SyncAction) -> Self {
        Self(format!(
            "Product {} in the catalog store, but search indexing failed. \
             Run POST /api/search/reindex to repair index consistency.",
            action
        ))
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a committed catalog write plus the outcome of its index write
#[derive(Debug, Clone, PartialEq)]
pub struct Synced<T> {
    pub value: T,
    pub warning: Option<SyncWarning>,
}

impl<T> Synced<T> {
    pub fn new(value: T, warning: Option<SyncWarning>) -> Self {
        Self { value, warning }
    }

    pub fn has_warning(&self) -> bool {
        self.warning.is_some()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Synced<U> {
        Synced {
            value: f(self.value),
            warning: self.warning,
        }
    }
}

/// Applies catalog mutations to the product index
#[derive(Clone)]
pub struct IndexSync {
    indices: IndexManager,
}

impl IndexSync {
    pub fn new(indices: IndexManager) -> Self {
        Self { indices }
    }

    /// Index a freshly created record
    pub async fn on_create(&self, product: &Product) -> Option<SyncWarning> {
        let result = self.upsert(product).await;
        self.settle(SyncAction::Created, product.id, result)
    }

    /// Replace the document of an updated record with its full current state
    pub async fn on_update(&self, product: &Product) -> Option<SyncWarning> {
        let result = self.upsert(product).await;
        self.settle(SyncAction::Updated, product.id, result)
    }

    /// Remove the document of a deleted record
    pub async fn on_delete(&self, id: i64) -> Option<SyncWarning> {
        let result = self.remove(id).await;
        self.settle(SyncAction::Deleted, id, result)
    }

    async fn upsert(&self, product: &Product) -> SearchResult<()> {
        self.indices.ensure_index().await?;
        self.indices
            .engine()
            .put_document(self.indices.index_name(), &ProductDocument::from(product))
            .await
    }

    async fn remove(&self, id: i64) -> SearchResult<()> {
        match self
            .indices
            .engine()
            .delete_document(self.indices.index_name(), &id.to_string())
            .await
        {
            Err(e) if e.is_not_found() => {
                debug!(product_id = id, "Document already absent from index");
                Ok(())
            }
            other => other,
        }
    }

    fn settle(&self, action: SyncAction, id: i64, result: SearchResult<()>) -> Option<SyncWarning> {
        match result {
            Ok(()) => None,
            Err(e) => {
                error!(
                    product_id = id,
                    action = %action,
                    index = %self.indices.index_name(),
                    error = %e,
                    "Search index write failed after catalog commit"
                );
                Some(SyncWarning::for_action(action))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_mentions_reindex() {
        let warning = SyncWarning::for_action(SyncAction::Updated);
        assert!(warning.message().starts_with("Product updated in the catalog store"));
        assert!(warning.message().contains("POST /api/search/reindex"));
    }

    #[test]
    fn test_warning_serializes_as_string() {
        let warning = SyncWarning::for_action(SyncAction::Deleted);
        let value = serde_json::to_value(&warning).unwrap();
        assert_eq!(value.as_str(), Some(warning.message()));
    }

    #[test]
    fn test_synced_map_keeps_warning() {
        let synced = Synced::new(2, Some(SyncWarning::for_action(SyncAction::Created)));
        let mapped = synced.map(|n| n * 10);

        assert_eq!(mapped.value, 20);
        assert!(mapped.has_warning());
    }
}
