//! Search request parsing and compilation into the engine query DSL

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Page size when the request does not name one
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Hard cap on the page size
pub const MAX_PAGE_SIZE: u64 = 50;

pub const HIGHLIGHT_PRE_TAG: &str = "<mark>";
pub const HIGHLIGHT_POST_TAG: &str = "</mark>";

/// Raw query-string parameters of a search call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub q: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub in_stock: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Result ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Engine score order
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    Newest,
}

impl SortOption {
    /// Unknown selectors fall back to relevance
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "price_asc" => SortOption::PriceAsc,
            "price_desc" => SortOption::PriceDesc,
            "newest" => SortOption::Newest,
            _ => SortOption::Relevance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Relevance => "relevance",
            SortOption::PriceAsc => "price_asc",
            SortOption::PriceDesc => "price_desc",
            SortOption::Newest => "newest",
        }
    }

    fn clause(&self) -> Option<Value> {
        match self {
            SortOption::Relevance => None,
            SortOption::PriceAsc => Some(json!([{ "price": { "order": "asc" } }])),
            SortOption::PriceDesc => Some(json!([{ "price": { "order": "desc" } }])),
            SortOption::Newest => Some(json!([{ "createdAt": { "order": "desc" } }])),
        }
    }
}

/// Structured product search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free text matched against name and description
    pub text: Option<String>,

    pub brand: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,

    /// Availability filter; `None` matches both
    pub in_stock: Option<bool>,

    pub sort: SortOption,

    /// 1-based page number
    pub page: u64,

    /// Requested page size, clamped when compiled
    pub limit: u64,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            text: None,
            brand: None,
            category: None,
            min_price: None,
            max_price: None,
            in_stock: None,
            sort: SortOption::default(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Engine request body plus the pagination it was built with
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub page: u64,
    pub limit: u64,
    pub body: Value,
}

impl SearchRequest {
    /// Create a new search request
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from query-string values; malformed values are ignored
    pub fn from_params(params: &SearchParams) -> Self {
        Self {
            text: non_empty(params.q.as_deref()),
            brand: non_empty(params.brand.as_deref()),
            category: non_empty(params.category.as_deref()),
            min_price: parse_optional_number(params.min_price.as_deref()),
            max_price: parse_optional_number(params.max_price.as_deref()),
            in_stock: parse_optional_bool(params.in_stock.as_deref()),
            sort: params
                .sort
                .as_deref()
                .map(SortOption::parse)
                .unwrap_or_default(),
            page: parse_positive_int(params.page.as_deref(), 1),
            limit: parse_positive_int(params.limit.as_deref(), DEFAULT_PAGE_SIZE),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn with_in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }

    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Page size after defaulting and clamping
    pub fn effective_limit(&self) -> u64 {
        match self.limit {
            0 => DEFAULT_PAGE_SIZE,
            limit => limit.min(MAX_PAGE_SIZE),
        }
    }

    pub fn effective_page(&self) -> u64 {
        self.page.max(1)
    }

    fn free_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Non-scoring clauses
    fn filters(&self) -> Vec<Value> {
        let mut filters = Vec::new();

        if let Some(brand) = &self.brand {
            filters.push(json!({ "term": { "brand": brand } }));
        }

        if let Some(category) = &self.category {
            filters.push(json!({ "term": { "category": category } }));
        }

        if self.min_price.is_some() || self.max_price.is_some() {
            let mut range = Map::new();
            if let Some(min) = self.min_price {
                range.insert("gte".to_string(), json!(min));
            }
            if let Some(max) = self.max_price {
                range.insert("lte".to_string(), json!(max));
            }
            filters.push(json!({ "range": { "price": range } }));
        }

        if let Some(in_stock) = self.in_stock {
            filters.push(json!({ "term": { "inStock": in_stock } }));
        }

        filters
    }

    /// Translate into an engine search body
    pub fn compile(&self) -> CompiledQuery {
        let page = self.effective_page();
        let limit = self.effective_limit();
        let text = self.free_text();

        let mut bool_query = Map::new();
        bool_query.insert("filter".to_string(), Value::Array(self.filters()));
        if let Some(text) = text {
            bool_query.insert(
                "must".to_string(),
                json!([{
                    "multi_match": {
                        "query": text,
                        "fields": ["name^3", "description"],
                        "fuzziness": "AUTO"
                    }
                }]),
            );
        }

        let mut body = Map::new();
        body.insert("from".to_string(), json!((page - 1).saturating_mul(limit)));
        body.insert("size".to_string(), json!(limit));
        body.insert("query".to_string(), json!({ "bool": bool_query }));
        body.insert("aggs".to_string(), aggregations());

        if text.is_some() {
            body.insert(
                "highlight".to_string(),
                json!({
                    "pre_tags": [HIGHLIGHT_PRE_TAG],
                    "post_tags": [HIGHLIGHT_POST_TAG],
                    "fields": { "name": {}, "description": {} }
                }),
            );
        }

        if let Some(sort) = self.sort.clause() {
            body.insert("sort".to_string(), sort);
        }

        CompiledQuery {
            page,
            limit,
            body: Value::Object(body),
        }
    }
}

fn aggregations() -> Value {
    json!({
        "brands": { "terms": { "field": "brand" } },
        "categories": { "terms": { "field": "category" } },
        "price_ranges": {
            "range": {
                "field": "price",
                "ranges": [
                    { "key": "0-100", "to": 100 },
                    { "key": "100-500", "from": 100, "to": 500 },
                    { "key": "500-1000", "from": 500, "to": 1000 },
                    { "key": "1000+", "from": 1000 }
                ]
            }
        }
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Leading integer of `value` if it is positive, otherwise `default`.
///
/// `"3"` and `"3abc"` both give 3; `"0"`, `"-2"` and `"abc"` give the default.
pub fn parse_positive_int(value: Option<&str>, default: u64) -> u64 {
    let Some(raw) = value else {
        return default;
    };

    let raw = raw.trim_start();
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    match digits[..end].parse::<u64>() {
        Ok(n) if n > 0 => n,
        _ => default,
    }
}

/// Finite number, or `None` for missing, empty or malformed input
pub fn parse_optional_number(value: Option<&str>) -> Option<f64> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// `true`/`false` in any case; anything else is unset
pub fn parse_optional_bool(value: Option<&str>) -> Option<bool> {
    match value?.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
