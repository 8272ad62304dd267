//! Search index lifecycle management

use crate::search::document::index_mapping;
use crate::search::engine::SearchEngine;
use crate::search::error::{SearchError, SearchResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Owns the product index on the search engine
#[derive(Clone)]
pub struct IndexManager {
    /// Engine handle shared with the rest of the search layer
    engine: Arc<dyn SearchEngine>,

    /// Target index
    index_name: String,
}

impl IndexManager {
    /// Create a new IndexManager
    pub fn new(engine: Arc<dyn SearchEngine>, index_name: impl Into<String>) -> Self {
        Self {
            engine,
            index_name: index_name.into(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn engine(&self) -> &Arc<dyn SearchEngine> {
        &self.engine
    }

    /// Create the index with the product mapping unless it already exists.
    ///
    /// Safe to call before every write. Engine failures are returned.
    pub async fn ensure_index(&self) -> SearchResult<()> {
        if self.engine.index_exists(&self.index_name).await? {
            return Ok(());
        }

        self.engine
            .create_index(&self.index_name, &index_mapping())
            .await?;
        info!(index = %self.index_name, "Created search index");
        Ok(())
    }

    /// Ping the engine until it answers, up to `attempts` times with a fixed
    /// `delay` in between. Returns the attempt that succeeded.
    ///
    /// Startup only; request paths never call this.
    pub async fn wait_for_engine(&self, attempts: u32, delay: Duration) -> SearchResult<u32> {
        let attempts = attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.engine.ping().await {
                Ok(()) => {
                    info!(attempt, "Search engine is reachable");
                    return Ok(attempt);
                }
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "Search engine not ready");
                    last_error = Some(e);
                }
            }

            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SearchError::Connection("search engine did not answer".to_string())
        }))
    }
}
