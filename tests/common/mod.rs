//! Shared fixtures for integration tests
//!
//! [`FakeEngine`] is an in-process [`SearchEngine`] that understands the
//! subset of the query DSL the crate emits: term and range filters, a fuzzy
//! `multi_match`, field sorts, highlighting and the three facet aggregations.

#![allow(dead_code)]

use async_trait::async_trait;
use catalog_search_sync::models::NewProduct;
use catalog_search_sync::search::{
    BulkSummary, IndexManager, ProductDocument, SearchEngine, SearchError, SearchResult,
};
use catalog_search_sync::state::{CatalogStore, InMemoryStore};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const INDEX: &str = "products_test";

#[derive(Default)]
pub struct FakeEngine {
    indices: Mutex<HashMap<String, BTreeMap<String, Value>>>,
    rejected_ids: Mutex<HashSet<String>>,
    down: AtomicBool,
    fail_writes: AtomicBool,
    fail_search: AtomicBool,
    pub index_creations: AtomicUsize,
    pub pings: AtomicUsize,
    pub bulk_requests: AtomicUsize,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every call fails as if the engine were unreachable
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Single-document writes fail; reads and bulk still work
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_search(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }

    /// Bulk requests report a per-item error for this document id
    pub fn reject_in_bulk(&self, id: &str) {
        self.rejected_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn document(&self, index: &str, id: &str) -> Option<Value> {
        self.indices
            .lock()
            .unwrap()
            .get(index)
            .and_then(|docs| docs.get(id).cloned())
    }

    pub fn document_count(&self, index: &str) -> usize {
        self.indices
            .lock()
            .unwrap()
            .get(index)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Put a raw document in place, bypassing the crate
    pub fn insert_raw(&self, index: &str, id: &str, source: Value) {
        self.indices
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .insert(id.to_string(), source);
    }

    fn check_up(&self) -> SearchResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(SearchError::Connection("connect ECONNREFUSED 127.0.0.1:9200".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_writable(&self) -> SearchResult<()> {
        self.check_up()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(SearchError::Status {
                status: 429,
                message: "es_rejected_execution_exception: rejected".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SearchEngine for FakeEngine {
    async fn ping(&self) -> SearchResult<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        self.check_up()
    }

    async fn cluster_health(&self) -> SearchResult<String> {
        self.check_up()?;
        Ok("green".to_string())
    }

    async fn index_exists(&self, index: &str) -> SearchResult<bool> {
        self.check_up()?;
        Ok(self.indices.lock().unwrap().contains_key(index))
    }

    async fn create_index(&self, index: &str, _definition: &Value) -> SearchResult<()> {
        self.check_up()?;
        self.index_creations.fetch_add(1, Ordering::SeqCst);
        self.indices
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default();
        Ok(())
    }

    async fn put_document(&self, index: &str, document: &ProductDocument) -> SearchResult<()> {
        self.check_writable()?;
        let source = serde_json::to_value(document)?;
        self.insert_raw(index, &document.document_id(), source);
        Ok(())
    }

    async fn delete_document(&self, index: &str, id: &str) -> SearchResult<()> {
        self.check_writable()?;
        let removed = self
            .indices
            .lock()
            .unwrap()
            .get_mut(index)
            .and_then(|docs| docs.remove(id));
        match removed {
            Some(_) => Ok(()),
            None => Err(SearchError::NotFound("not_found".to_string())),
        }
    }

    async fn bulk_index(&self, index: &str, documents: &[ProductDocument]) -> SearchResult<BulkSummary> {
        self.check_up()?;
        self.bulk_requests.fetch_add(1, Ordering::SeqCst);

        let rejected = self.rejected_ids.lock().unwrap().clone();
        let mut failed = 0;
        for document in documents {
            let id = document.document_id();
            if rejected.contains(&id) {
                failed += 1;
                continue;
            }
            self.insert_raw(index, &id, serde_json::to_value(document)?);
        }

        Ok(BulkSummary {
            errors: failed > 0,
            items: documents.len(),
            failed,
        })
    }

    async fn delete_all(&self, index: &str) -> SearchResult<u64> {
        self.check_up()?;
        let mut indices = self.indices.lock().unwrap();
        let docs = indices.entry(index.to_string()).or_default();
        let deleted = docs.len() as u64;
        docs.clear();
        Ok(deleted)
    }

    async fn count(&self, index: &str) -> SearchResult<u64> {
        self.check_up()?;
        Ok(self.document_count(index) as u64)
    }

    async fn search(&self, index: &str, body: &Value) -> SearchResult<Value> {
        self.check_up()?;
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(SearchError::Status {
                status: 500,
                message: "search_phase_execution_exception: all shards failed".to_string(),
            });
        }

        let indices = self.indices.lock().unwrap();
        let Some(docs) = indices.get(index) else {
            return Err(SearchError::NotFound(format!("no such index [{}]", index)));
        };
        Ok(evaluate(docs, body))
    }

    fn nodes(&self) -> Vec<String> {
        vec!["http://fake-engine:9200".to_string()]
    }
}

/// Index manager over a fresh fake engine
pub fn fake_indices() -> (Arc<FakeEngine>, IndexManager) {
    let engine = FakeEngine::new();
    let indices = IndexManager::new(engine.clone(), INDEX);
    (engine, indices)
}

pub fn memory_store() -> Arc<dyn CatalogStore> {
    Arc::new(InMemoryStore::new())
}

pub fn new_product(name: &str, brand: &str, category: &str, price: f64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        brand: brand.to_string(),
        category: category.to_string(),
        description: None,
        price,
        rating: None,
        in_stock: None,
    }
}

fn evaluate(docs: &BTreeMap<String, Value>, body: &Value) -> Value {
    let bool_query = &body["query"]["bool"];
    let filters = bool_query["filter"].as_array().cloned().unwrap_or_default();
    let text = bool_query["must"][0]["multi_match"]["query"].as_str();

    let mut matched: Vec<(String, &Value, f64, Map<String, Value>)> = Vec::new();
    for (id, source) in docs {
        if !filters.iter().all(|filter| passes(filter, source)) {
            continue;
        }

        let (score, highlight) = match text {
            Some(text) => match score_text(text, source) {
                Some(result) => result,
                None => continue,
            },
            None => (1.0, Map::new()),
        };
        matched.push((id.clone(), source, score, highlight));
    }

    let sort = body["sort"][0].as_object().and_then(|s| s.iter().next());
    match sort {
        Some((field, spec)) => {
            let descending = spec["order"] == "desc";
            matched.sort_by(|a, b| {
                let ordering = compare(&a.1[field.as_str()], &b.1[field.as_str()]);
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        None => matched.sort_by(|a, b| b.2.total_cmp(&a.2)),
    }

    let facets = aggregations(matched.iter().map(|m| m.1));
    let from = body["from"].as_u64().unwrap_or(0) as usize;
    let size = body["size"].as_u64().unwrap_or(10) as usize;
    let wants_highlight = body.get("highlight").is_some();

    let hits: Vec<Value> = matched
        .iter()
        .skip(from)
        .take(size)
        .map(|(id, source, score, highlight)| {
            let score = if sort.is_some() { Value::Null } else { json!(score) };
            let mut hit = json!({
                "_index": INDEX,
                "_id": id,
                "_score": score,
                "_source": source,
            });
            if wants_highlight && !highlight.is_empty() {
                hit["highlight"] = Value::Object(highlight.clone());
            }
            hit
        })
        .collect();

    json!({
        "took": 1,
        "timed_out": false,
        "hits": {
            "total": { "value": matched.len(), "relation": "eq" },
            "hits": hits,
        },
        "aggregations": facets,
    })
}

fn passes(filter: &Value, source: &Value) -> bool {
    if let Some(term) = filter.get("term").and_then(Value::as_object) {
        return term.iter().all(|(field, value)| &source[field.as_str()] == value);
    }
    if let Some(range) = filter.get("range").and_then(Value::as_object) {
        return range.iter().all(|(field, bounds)| {
            let Some(value) = source[field.as_str()].as_f64() else {
                return false;
            };
            let above = bounds["gte"].as_f64().map(|min| value >= min).unwrap_or(true);
            let below = bounds["lte"].as_f64().map(|max| value <= max).unwrap_or(true);
            above && below
        });
    }
    true
}

fn compare(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.as_str().unwrap_or("").cmp(b.as_str().unwrap_or("")),
    }
}

/// Edit budget of `fuzziness: AUTO`
fn allowed_edits(term: &str) -> usize {
    match term.chars().count() {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![i + 1];
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current.push(substitution.min(previous[j + 1] + 1).min(current[j] + 1));
        }
        previous = current;
    }
    previous[b.len()]
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Score a document against fuzzy free text on name (x3) and description.
/// Every query term must match somewhere.
fn score_text(text: &str, source: &Value) -> Option<(f64, Map<String, Value>)> {
    let query_terms = tokens(text);
    let mut score = 0.0;
    let mut highlight = Map::new();

    for (field, boost) in [("name", 3.0), ("description", 1.0)] {
        let value = source[field].as_str().unwrap_or("");
        let mut marked = Vec::new();
        let mut hits = 0;

        for word in value.split(' ') {
            let lowered = word.to_lowercase();
            let is_hit = query_terms
                .iter()
                .any(|term| levenshtein(term, &lowered) <= allowed_edits(term));
            if is_hit {
                hits += 1;
                marked.push(format!("<mark>{}</mark>", word));
            } else {
                marked.push(word.to_string());
            }
        }

        if hits > 0 {
            score += boost * hits as f64;
            highlight.insert(field.to_string(), json!([marked.join(" ")]));
        }
    }

    let all_terms_match = query_terms.iter().all(|term| {
        ["name", "description"].iter().any(|field| {
            tokens(source[*field].as_str().unwrap_or(""))
                .iter()
                .any(|word| levenshtein(term, word) <= allowed_edits(term))
        })
    });

    (all_terms_match && !query_terms.is_empty()).then_some((score, highlight))
}

fn aggregations<'a>(sources: impl Iterator<Item = &'a Value>) -> Value {
    let mut brands: BTreeMap<String, u64> = BTreeMap::new();
    let mut categories: BTreeMap<String, u64> = BTreeMap::new();
    let mut ranges = [0u64; 4];

    for source in sources {
        *brands.entry(source["brand"].as_str().unwrap_or("").to_string()).or_default() += 1;
        *categories
            .entry(source["category"].as_str().unwrap_or("").to_string())
            .or_default() += 1;

        let price = source["price"].as_f64().unwrap_or(0.0);
        let bucket = match price {
            p if p < 100.0 => 0,
            p if p < 500.0 => 1,
            p if p < 1000.0 => 2,
            _ => 3,
        };
        ranges[bucket] += 1;
    }

    let terms = |counts: BTreeMap<String, u64>| {
        let mut buckets: Vec<(String, u64)> = counts.into_iter().collect();
        buckets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        json!({
            "buckets": buckets
                .into_iter()
                .map(|(key, count)| json!({ "key": key, "doc_count": count }))
                .collect::<Vec<_>>()
        })
    };

    json!({
        "brands": terms(brands),
        "categories": terms(categories),
        "price_ranges": {
            "buckets": [
                { "key": "0-100", "to": 100.0, "doc_count": ranges[0] },
                { "key": "100-500", "from": 100.0, "to": 500.0, "doc_count": ranges[1] },
                { "key": "500-1000", "from": 500.0, "to": 1000.0, "doc_count": ranges[2] },
                { "key": "1000+", "from": 1000.0, "doc_count": ranges[3] }
            ]
        }
    })
}
