//! Normalization of raw engine search responses

use crate::search::engine::{extract_body, parse_total};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Record id, taken from the engine document id
    pub id: i64,

    /// Relevance score; engines omit it for sorted queries
    pub score: Option<f64>,

    /// Projected document fields
    #[serde(flatten)]
    pub source: Map<String, Value>,

    /// Highlighted fragments per field
    pub highlight: Option<Value>,
}

/// Count for one facet value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetBucket {
    pub key: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub brands: Vec<FacetBucket>,
    pub categories: Vec<FacetBucket>,
    pub price_ranges: Vec<FacetBucket>,
}

/// A page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub hits: Vec<SearchHit>,
    pub facets: Facets,
}

impl SearchPage {
    /// Map a raw engine response. Missing sections yield empty results.
    pub fn normalize(page: u64, limit: u64, response: &Value) -> Self {
        let body = extract_body(response);
        let hits_section = body.get("hits");

        let total = parse_total(hits_section.and_then(|h| h.get("total")));
        let hits = hits_section
            .and_then(|h| h.get("hits"))
            .and_then(Value::as_array)
            .map(|hits| hits.iter().filter_map(normalize_hit).collect())
            .unwrap_or_default();

        let aggregations = body.get("aggregations");
        let facet = |name: &str| buckets(aggregations.and_then(|a| a.get(name)));

        Self {
            page,
            limit,
            total,
            hits,
            facets: Facets {
                brands: facet("brands"),
                categories: facet("categories"),
                price_ranges: facet("price_ranges"),
            },
        }
    }
}

fn normalize_hit(hit: &Value) -> Option<SearchHit> {
    let id = match hit.get("_id")? {
        Value::String(id) => id.trim().parse::<i64>().ok()?,
        Value::Number(id) => id.as_i64()?,
        _ => return None,
    };

    let mut source = hit
        .get("_source")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    source.remove("id");
    source.remove("score");
    source.remove("highlight");

    let highlight = hit
        .get("highlight")
        .filter(|h| h.as_object().map(|o| !o.is_empty()).unwrap_or(false))
        .cloned();

    Some(SearchHit {
        id,
        score: hit.get("_score").and_then(Value::as_f64),
        source,
        highlight,
    })
}

fn buckets(aggregation: Option<&Value>) -> Vec<FacetBucket> {
    aggregation
        .and_then(|a| a.get("buckets"))
        .and_then(Value::as_array)
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|bucket| {
                    let key = match bucket.get("key")? {
                        Value::String(key) => key.clone(),
                        other => other.to_string(),
                    };
                    let count = bucket.get("doc_count").and_then(Value::as_u64).unwrap_or(0);
                    Some(FacetBucket { key, count })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response() -> Value {
        json!({
            "took": 3,
            "hits": {
                "total": { "value": 1, "relation": "eq" },
                "max_score": 2.1,
                "hits": [{
                    "_index": "products_v1",
                    "_id": "1",
                    "_score": 2.1,
                    "_source": {
                        "id": 1,
                        "name": "Runner Pro Shoes",
                        "brand": "Nike",
                        "price": 129.99
                    },
                    "highlight": { "name": ["<mark>Runner</mark> Pro Shoes"] }
                }]
            },
            "aggregations": {
                "brands": { "buckets": [{ "key": "Nike", "doc_count": 1 }] },
                "categories": { "buckets": [{ "key": "Shoes", "doc_count": 1 }] },
                "price_ranges": {
                    "buckets": [
                        { "key": "0-100", "to": 100.0, "doc_count": 0 },
                        { "key": "100-500", "from": 100.0, "to": 500.0, "doc_count": 1 }
                    ]
                }
            }
        })
    }

    #[test]
    fn test_normalize_full_response() {
        let page = SearchPage::normalize(1, 10, &response());

        assert_eq!(page.total, 1);
        assert_eq!(page.hits.len(), 1);

        let hit = &page.hits[0];
        assert_eq!(hit.id, 1);
        assert_eq!(hit.score, Some(2.1));
        assert_eq!(hit.source["name"], "Runner Pro Shoes");
        assert!(hit.highlight.as_ref().unwrap()["name"].is_array());

        assert_eq!(page.facets.brands, vec![FacetBucket { key: "Nike".into(), count: 1 }]);
        assert_eq!(page.facets.price_ranges[1].key, "100-500");
        assert_eq!(page.facets.price_ranges[1].count, 1);
    }

    #[test]
    fn test_hit_serializes_flat() {
        let page = SearchPage::normalize(1, 10, &response());
        let value = serde_json::to_value(&page.hits[0]).unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["brand"], "Nike");
        assert!(value.get("source").is_none());
    }

    #[test]
    fn test_bare_total_and_missing_aggregations() {
        let raw = json!({
            "hits": {
                "total": 4,
                "hits": [{ "_id": "9", "_score": null, "_source": { "name": "Fan" } }]
            }
        });
        let page = SearchPage::normalize(2, 5, &raw);

        assert_eq!(page.total, 4);
        assert_eq!(page.hits[0].score, None);
        assert_eq!(page.hits[0].highlight, None);
        assert_eq!(page.facets, Facets::default());
    }

    #[test]
    fn test_empty_response() {
        let page = SearchPage::normalize(1, 10, &json!({}));
        assert_eq!(page.total, 0);
        assert!(page.hits.is_empty());
        assert!(page.facets.brands.is_empty());
    }
}
