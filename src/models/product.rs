use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A catalog record as held by the authoritative store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned identifier, immutable once created
    pub id: i64,

    pub name: String,
    pub brand: String,
    pub category: String,

    /// Free-text description
    pub description: Option<String>,

    /// Positive price with two decimal places
    pub price: f64,

    /// Rating between 0 and 5
    pub rating: f64,

    /// Availability flag
    pub in_stock: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a record from a validated create payload
    pub fn from_new(id: i64, new: NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            brand: new.brand,
            category: new.category,
            description: new.description,
            price: round_price(new.price),
            rating: new.rating.unwrap_or(0.0),
            in_stock: new.in_stock.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated partial update onto this record
    pub fn apply(&mut self, update: ProductUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(brand) = update.brand {
            self.brand = brand;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(price) = update.price {
            self.price = round_price(price);
        }
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if let Some(in_stock) = update.in_stock {
            self.in_stock = in_stock;
        }
    }
}

/// Prices are stored with two decimal places.
pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// Payload for creating a catalog record
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "brand is required"))]
    pub brand: String,

    #[validate(length(min = 1, max = 255, message = "category is required"))]
    pub category: String,

    #[serde(default)]
    pub description: Option<String>,

    #[validate(range(
        exclusive_min = 0.0,
        max = 99_999_999.99,
        message = "price must be greater than 0 and at most 99999999.99"
    ))]
    pub price: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0, message = "rating must be between 0 and 5"))]
    pub rating: Option<f64>,

    #[serde(default)]
    pub in_stock: Option<bool>,
}

impl NewProduct {
    /// Trim text fields before validation
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.brand = self.brand.trim().to_string();
        self.category = self.category.trim().to_string();
        self.description = self.description.map(|d| d.trim().to_string());
        self
    }
}

/// Payload for updating a catalog record; at least one field must be present
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_has_changes"))]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "brand must not be empty"))]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 255, message = "category must not be empty"))]
    pub category: Option<String>,

    pub description: Option<String>,

    #[validate(range(
        exclusive_min = 0.0,
        max = 99_999_999.99,
        message = "price must be greater than 0 and at most 99999999.99"
    ))]
    pub price: Option<f64>,

    #[validate(range(min = 0.0, max = 5.0, message = "rating must be between 0 and 5"))]
    pub rating: Option<f64>,

    pub in_stock: Option<bool>,
}

impl ProductUpdate {
    /// Trim text fields before validation
    pub fn normalized(mut self) -> Self {
        let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
        self.name = trim(self.name);
        self.brand = trim(self.brand);
        self.category = trim(self.category);
        self.description = trim(self.description);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brand.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.rating.is_none()
            && self.in_stock.is_none()
    }
}

fn validate_has_changes(update: &ProductUpdate) -> Result<(), ValidationError> {
    if update.is_empty() {
        let mut error = ValidationError::new("empty_update");
        error.message = Some("At least one field must be provided for update".into());
        return Err(error);
    }
    Ok(())
}
