//! Search engine boundary
//!
//! [`SearchEngine`] is the document-oriented API the rest of the crate talks
//! to. The free functions below are the only place that knows about the
//! engine's alternative response shapes.

use crate::search::document::ProductDocument;
use crate::search::error::SearchResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a bulk write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSummary {
    /// Engine-reported error flag for the whole request
    pub errors: bool,

    /// Items the engine acknowledged
    pub items: usize,

    /// Items that carry a per-document error
    pub failed: usize,
}

/// Abstracts the search engine service (OpenSearch, Elasticsearch, test doubles)
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Check that a node answers
    async fn ping(&self) -> SearchResult<()>;

    /// Cluster health colour (`green`, `yellow`, `red`)
    async fn cluster_health(&self) -> SearchResult<String>;

    async fn index_exists(&self, index: &str) -> SearchResult<bool>;

    /// Create an index with the given settings/mappings body
    async fn create_index(&self, index: &str, definition: &Value) -> SearchResult<()>;

    /// Insert or fully replace a document
    async fn put_document(&self, index: &str, document: &ProductDocument) -> SearchResult<()>;

    /// Delete a document; a missing document yields `SearchError::NotFound`
    async fn delete_document(&self, index: &str, id: &str) -> SearchResult<()>;

    /// Index many documents in one request
    async fn bulk_index(&self, index: &str, documents: &[ProductDocument]) -> SearchResult<BulkSummary>;

    /// Remove every document from the index, returning how many were deleted
    async fn delete_all(&self, index: &str) -> SearchResult<u64>;

    /// Number of documents in the index
    async fn count(&self, index: &str) -> SearchResult<u64>;

    /// Run a query body and return the raw response
    async fn search(&self, index: &str, body: &Value) -> SearchResult<Value>;

    /// Nodes this engine handle targets
    fn nodes(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Some clients wrap responses as `{ "body": ... }`; accept both.
pub fn extract_body(response: &Value) -> &Value {
    match response.get("body") {
        Some(body) if response.as_object().map(|o| o.len() == 1).unwrap_or(false) => body,
        _ => response,
    }
}

/// Existence answered as a bare boolean or as `{ "exists": bool }`.
pub fn parse_exists(response: &Value) -> bool {
    match extract_body(response) {
        Value::Bool(exists) => *exists,
        Value::Object(obj) => match obj.get("exists") {
            Some(Value::Bool(exists)) => *exists,
            Some(other) => is_truthy(other),
            None => !obj.is_empty(),
        },
        other => is_truthy(other),
    }
}

/// Hit total as a bare number or as `{ "value": n, "relation": .. }`; 0 when absent.
pub fn parse_total(total: Option<&Value>) -> u64 {
    match total {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::Object(obj)) => obj.get("value").and_then(Value::as_u64).unwrap_or(0),
        _ => 0,
    }
}

/// `_count` response (`{ "count": n }`) or a bare number; 0 when absent.
pub fn parse_count(response: &Value) -> u64 {
    let body = extract_body(response);
    match body {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::Object(obj) => parse_total(obj.get("count")),
        _ => 0,
    }
}

/// Per-item failures of a `_bulk` response.
///
/// Items are only inspected when the top-level `errors` flag is set.
pub fn parse_bulk(response: &Value) -> BulkSummary {
    let body = extract_body(response);
    let errors = body.get("errors").and_then(Value::as_bool).unwrap_or(false);
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let failed = if errors {
        items
            .iter()
            .filter(|item| {
                item.get("index")
                    .and_then(|action| action.get("error"))
                    .map(|error| !error.is_null())
                    .unwrap_or(false)
            })
            .count()
    } else {
        0
    };

    BulkSummary {
        errors,
        items: items.len(),
        failed,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
