//! Search document structures and the index field mapping

use crate::models::Product;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Search projection of a catalog record.
///
/// Always derived from a [`Product`]; never authored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDocument {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: f64,
    pub rating: f64,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

impl ProductDocument {
    /// Engine document id (the record id as a string)
    pub fn document_id(&self) -> String {
        self.id.to_string()
    }
}

impl From<&Product> for ProductDocument {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            price: product.price,
            rating: product.rating,
            in_stock: product.in_stock,
            created_at: product.created_at,
        }
    }
}

impl From<Product> for ProductDocument {
    fn from(product: Product) -> Self {
        Self::from(&product)
    }
}

/// Field mapping for the product index.
///
/// `name` is full-text with a `keyword` sub-field for exact matching;
/// brand and category are exact-match only so they can be filtered and faceted.
pub fn index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "name": {
                    "type": "text",
                    "fields": {
                        "keyword": { "type": "keyword" }
                    }
                },
                "description": { "type": "text" },
                "brand": { "type": "keyword" },
                "category": { "type": "keyword" },
                "price": { "type": "float" },
                "rating": { "type": "float" },
                "inStock": { "type": "boolean" },
                "createdAt": { "type": "date" }
            }
        }
    })
}
