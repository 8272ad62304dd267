//! HTTP client for OpenSearch-compatible engines

use crate::search::config::SearchConfig;
use crate::search::document::ProductDocument;
use crate::search::engine::{parse_bulk, parse_count, parse_exists, BulkSummary, SearchEngine};
use crate::search::error::{SearchError, SearchResult};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Base delay between retries; grows linearly with the attempt number
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

enum RequestBody {
    Json(Value),
    NdJson(String),
}

/// Search engine handle talking to one or more nodes over HTTP.
///
/// Every request gets the configured timeout and is retried on connection
/// failures and 502/503/504, moving to the next node each time. Callers do not
/// add retries of their own.
#[derive(Clone)]
pub struct OpenSearchClient {
    http: Client,
    nodes: Vec<String>,
    max_retries: u32,
}

impl OpenSearchClient {
    /// Create a new client from configuration
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                SearchError::InvalidConfiguration(format!("Failed to create HTTP client: {}", e))
            })?;

        let nodes = config.nodes();
        if nodes.is_empty() {
            return Err(SearchError::InvalidConfiguration(
                "At least one search node is required".to_string(),
            ));
        }

        Ok(Self {
            http,
            nodes,
            max_retries: config.max_retries,
        })
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> SearchResult<Value> {
        let attempts = self.max_retries + 1;
        let mut attempt = 0;

        loop {
            let node = &self.nodes[attempt as usize % self.nodes.len()];

            match self.send_once(node, method.clone(), path, body.as_ref()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    attempt += 1;
                    warn!(
                        node = %node,
                        path = %path,
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "Search engine request failed, retrying"
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(
        &self,
        node: &str,
        method: Method,
        path: &str,
        body: Option<&RequestBody>,
    ) -> SearchResult<Value> {
        let url = format!("{}{}", node, path);
        debug!(method = %method, url = %url, "Search engine request");

        let mut request = self.http.request(method, &url);
        request = match body {
            Some(RequestBody::Json(value)) => request.json(value),
            Some(RequestBody::NdJson(lines)) => request
                .header(CONTENT_TYPE, "application/x-ndjson")
                .body(lines.clone()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status.is_success() {
            return Ok(value);
        }

        let message = error_message(&value).unwrap_or_else(|| status.to_string());
        if status == StatusCode::NOT_FOUND {
            Err(SearchError::NotFound(message))
        } else {
            Err(SearchError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Pull `type: reason` out of an engine error body
fn error_message(body: &Value) -> Option<String> {
    match body.get("error") {
        Some(Value::Object(error)) => {
            let kind = error.get("type").and_then(Value::as_str).unwrap_or("error");
            let reason = error.get("reason").and_then(Value::as_str).unwrap_or("");
            Some(format!("{}: {}", kind, reason))
        }
        Some(Value::String(error)) => Some(error.clone()),
        _ => match body {
            Value::String(text) => Some(text.clone()),
            _ => body.get("result").and_then(Value::as_str).map(str::to_string),
        },
    }
}

fn bulk_payload(index: &str, documents: &[ProductDocument]) -> SearchResult<String> {
    let mut lines = String::new();
    for document in documents {
        let action = json!({ "index": { "_index": index, "_id": document.document_id() } });
        lines.push_str(&serde_json::to_string(&action)?);
        lines.push('\n');
        lines.push_str(&serde_json::to_string(document)?);
        lines.push('\n');
    }
    Ok(lines)
}

#[async_trait]
impl SearchEngine for OpenSearchClient {
    async fn ping(&self) -> SearchResult<()> {
        self.request(Method::HEAD, "/", None).await?;
        Ok(())
    }

    async fn cluster_health(&self) -> SearchResult<String> {
        let body = self.request(Method::GET, "/_cluster/health", None).await?;
        Ok(body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string())
    }

    async fn index_exists(&self, index: &str) -> SearchResult<bool> {
        match self.request(Method::HEAD, &format!("/{}", index), None).await {
            // HEAD answers carry no body; gateways that do send one are parsed
            Ok(Value::Null) => Ok(true),
            Ok(body) => Ok(parse_exists(&body)),
            Err(SearchError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_index(&self, index: &str, definition: &Value) -> SearchResult<()> {
        let result = self
            .request(
                Method::PUT,
                &format!("/{}", index),
                Some(RequestBody::Json(definition.clone())),
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            // Lost a creation race with another process; the index is there
            Err(SearchError::Status { status: 400, message })
                if message.contains("resource_already_exists_exception") =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn put_document(&self, index: &str, document: &ProductDocument) -> SearchResult<()> {
        let body = serde_json::to_value(document)?;
        self.request(
            Method::PUT,
            &format!("/{}/_doc/{}?refresh=wait_for", index, document.document_id()),
            Some(RequestBody::Json(body)),
        )
        .await?;
        Ok(())
    }

    async fn delete_document(&self, index: &str, id: &str) -> SearchResult<()> {
        self.request(
            Method::DELETE,
            &format!("/{}/_doc/{}?refresh=wait_for", index, id),
            None,
        )
        .await?;
        Ok(())
    }

    async fn bulk_index(&self, index: &str, documents: &[ProductDocument]) -> SearchResult<BulkSummary> {
        if documents.is_empty() {
            return Ok(BulkSummary::default());
        }

        let payload = bulk_payload(index, documents)?;
        let body = self
            .request(
                Method::POST,
                "/_bulk?refresh=wait_for",
                Some(RequestBody::NdJson(payload)),
            )
            .await?;
        Ok(parse_bulk(&body))
    }

    async fn delete_all(&self, index: &str) -> SearchResult<u64> {
        let body = self
            .request(
                Method::POST,
                &format!("/{}/_delete_by_query?conflicts=proceed&refresh=true", index),
                Some(RequestBody::Json(json!({ "query": { "match_all": {} } }))),
            )
            .await?;
        Ok(body.get("deleted").and_then(Value::as_u64).unwrap_or(0))
    }

    async fn count(&self, index: &str) -> SearchResult<u64> {
        let body = self
            .request(Method::GET, &format!("/{}/_count", index), None)
            .await?;
        Ok(parse_count(&body))
    }

    async fn search(&self, index: &str, body: &Value) -> SearchResult<Value> {
        self.request(
            Method::POST,
            &format!("/{}/_search", index),
            Some(RequestBody::Json(body.clone())),
        )
        .await
    }

    fn nodes(&self) -> Vec<String> {
        self.nodes.clone()
    }
}
