//! Product search service

use crate::search::error::SearchResult;
use crate::search::index::IndexManager;
use crate::search::query::SearchRequest;
use crate::search::response::SearchPage;
use tracing::debug;

/// Runs compiled product queries against the index
#[derive(Clone)]
pub struct SearchService {
    indices: IndexManager,
}

impl SearchService {
    pub fn new(indices: IndexManager) -> Self {
        Self { indices }
    }

    pub fn index_manager(&self) -> &IndexManager {
        &self.indices
    }

    /// Search for products. Engine failures are returned as errors; there is
    /// no fallback to the catalog store.
    pub async fn search(&self, request: &SearchRequest) -> SearchResult<SearchPage> {
        let start_time = std::time::Instant::now();
        let compiled = request.compile();

        let response = self
            .indices
            .engine()
            .search(self.indices.index_name(), &compiled.body)
            .await?;
        let page = SearchPage::normalize(compiled.page, compiled.limit, &response);

        debug!(
            total = page.total,
            returned = page.hits.len(),
            sort = request.sort.as_str(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Product search complete"
        );

        Ok(page)
    }
}
