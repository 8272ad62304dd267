//! Product search on an external OpenSearch-compatible engine
//!
//! The catalog store owns product data; the engine holds a disposable
//! projection of it.
//!
//! ```text
//!   catalog write ──► IndexSync ──┐
//!   reindex ────────► Reconciler ─┼─► IndexManager ──► SearchEngine (HTTP)
//!   search ─────────► SearchService (compile ─► engine ─► normalize)
//! ```
//!
//! - [`IndexSync`] mirrors each committed create/update/delete and turns
//!   engine failures into a [`SyncWarning`].
//! - [`Reconciler`] clears the index and bulk-loads every record.
//! - [`SearchRequest::compile`] builds the bool query, sort, highlight and
//!   facet aggregations; [`SearchPage::normalize`] maps the response back.
//!
//! # Example
//!
//! ```no_run
//! use catalog_search_sync::search::{
//!     IndexManager, OpenSearchClient, SearchConfig, SearchRequest, SearchService, SortOption,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SearchConfig::default();
//!     let engine = Arc::new(OpenSearchClient::new(&config)?);
//!     let search = SearchService::new(IndexManager::new(engine, config.index_name.clone()));
//!
//!     let request = SearchRequest::new()
//!         .with_text("running shoes")
//!         .with_sort(SortOption::PriceAsc)
//!         .with_limit(20);
//!
//!     let page = search.search(&request).await?;
//!     println!("Found {} products", page.total);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod document;
mod engine;
mod error;
mod index;
mod query;
mod reindex;
mod response;
mod service;
mod sync;

pub use client::OpenSearchClient;
pub use config::{SearchConfig, SearchConfigBuilder};
pub use document::{index_mapping, ProductDocument};
pub use engine::{extract_body, parse_bulk, parse_count, parse_exists, parse_total, BulkSummary, SearchEngine};
pub use error::{SearchError, SearchResult};
pub use index::IndexManager;
pub use query::{
    parse_optional_bool, parse_optional_number, parse_positive_int, CompiledQuery, SearchParams,
    SearchRequest, SortOption, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use reindex::{ReconciliationReport, Reconciler};
pub use response::{FacetBucket, Facets, SearchHit, SearchPage};
pub use service::SearchService;
pub use sync::{IndexSync, SyncAction, SyncWarning, Synced};
