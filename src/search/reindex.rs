//! Full rebuild of the product index from the catalog store

use crate::error::Result;
use crate::search::document::ProductDocument;
use crate::search::index::IndexManager;
use crate::state::store::CatalogStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Summary of a rebuild pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Records the engine accepted
    pub indexed: u64,

    /// Records the bulk response reported as failed
    pub failed: u64,

    /// Engine-level error flag of the bulk response
    pub had_errors: bool,

    /// Records in the catalog store at the time of the pass
    pub record_count: u64,

    /// Documents in the index after the pass
    pub index_document_count: u64,
}

impl ReconciliationReport {
    /// True when every record made it into the index
    pub fn is_consistent(&self) -> bool {
        self.failed == 0 && !self.had_errors && self.index_document_count >= self.record_count
    }
}

/// Rebuilds the index so it matches the catalog store exactly.
///
/// Writes that land in the store while a pass is running may or may not be
/// reflected in the result; callers rerun the pass if that matters.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn CatalogStore>,
    indices: IndexManager,
}

impl Reconciler {
    pub fn new(store: Arc<dyn CatalogStore>, indices: IndexManager) -> Self {
        Self { store, indices }
    }

    /// Clear the index and bulk-load every record.
    ///
    /// Store and engine failures are errors; partial indexing is reported in
    /// the returned report.
    pub async fn rebuild_all(&self) -> Result<ReconciliationReport> {
        let index = self.indices.index_name();
        let engine = self.indices.engine();

        self.indices.ensure_index().await?;

        let products = self.store.find_all().await?;

        // Drops documents whose records were deleted while the index was unreachable
        let cleared = engine.delete_all(index).await?;
        info!(index = %index, cleared, records = products.len(), "Cleared index for rebuild");

        if products.is_empty() {
            return Ok(ReconciliationReport::default());
        }

        let documents: Vec<ProductDocument> = products.iter().map(ProductDocument::from).collect();
        let summary = engine.bulk_index(index, &documents).await?;
        let index_document_count = engine.count(index).await?;

        let record_count = documents.len() as u64;
        let failed = summary.failed as u64;
        let report = ReconciliationReport {
            indexed: record_count.saturating_sub(failed),
            failed,
            had_errors: summary.errors,
            record_count,
            index_document_count,
        };

        if report.is_consistent() {
            info!(
                index = %index,
                indexed = report.indexed,
                index_document_count,
                "Index rebuild complete"
            );
        } else {
            warn!(
                index = %index,
                indexed = report.indexed,
                failed = report.failed,
                record_count,
                index_document_count,
                "Index rebuild finished with drift"
            );
        }

        Ok(report)
    }
}
