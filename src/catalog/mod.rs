//! Catalog operations exposed to the HTTP layer

pub mod health;
pub mod seed;
pub mod service;

pub use health::{check_health, HealthReport, Status};
pub use seed::sample_products;
pub use service::{CatalogService, ProductList, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
