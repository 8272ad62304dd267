pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::catalog::CatalogService;
use crate::search::{IndexManager, SearchService};
use crate::state::CatalogStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub search: Arc<SearchService>,
}

impl AppState {
    /// Wire the catalog and search services around one store and one index
    pub fn new(store: Arc<dyn CatalogStore>, indices: IndexManager) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(store, indices.clone())),
            search: Arc::new(SearchService::new(indices)),
        }
    }
}
