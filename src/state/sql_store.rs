//! Relational catalog store on SQLite
//!
//! The `products` table is the system of record. The schema is applied on
//! connect and tracked in a `_migrations` table so it is only created once.

use crate::error::{AppError, Result};
use crate::models::{round_price, NewProduct, Product};
use crate::state::CatalogStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;

/// Current schema version
pub const SCHEMA_VERSION: i64 = 1;

const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

const MIGRATION_V1: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        brand TEXT NOT NULL,
        category TEXT NOT NULL,
        description TEXT,
        price REAL NOT NULL CHECK (price > 0),
        rating REAL NOT NULL DEFAULT 0 CHECK (rating >= 0 AND rating <= 5),
        in_stock BOOLEAN NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_products_created_at ON products(created_at);
"#;

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    brand: String,
    category: String,
    description: Option<String>,
    price: f64,
    rating: f64,
    in_stock: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand: row.brand,
            category: row.category,
            description: row.description,
            price: row.price,
            rating: row.rating,
            in_stock: row.in_stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Catalog store backed by a SQLite connection pool
#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    /// Connect to the database at `url` and apply the schema
    pub async fn connect(url: &str, pool_size: u32) -> Result<Self> {
        let in_memory = url.contains(":memory:");

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::Configuration(format!("Invalid database url {}: {}", url, e)))?
            .create_if_missing(true);
        let options = if in_memory {
            options
        } else {
            if let Some(parent) = options.get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            options.journal_mode(SqliteJournalMode::Wal)
        };

        // Every in-memory connection is its own database
        let max_connections = if in_memory { 1 } else { pool_size.max(1) };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::info!(url = %url, max_connections, "Initialized SQL catalog store");
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_MIGRATIONS_TABLE)
            .execute(&self.pool)
            .await?;

        let applied: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await?;

        if applied.unwrap_or(0) < SCHEMA_VERSION {
            let mut tx = self.pool.begin().await?;
            sqlx::raw_sql(MIGRATION_V1).execute(&mut *tx).await?;
            sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
                .bind(SCHEMA_VERSION)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            tracing::info!(version = SCHEMA_VERSION, "Applied catalog schema migration");
        }

        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SqlStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create(&self, new: NewProduct) -> Result<Product> {
        let now = Utc::now();
        let row: ProductRow = sqlx::query_as(
            r#"
            INSERT INTO products
                (name, brand, category, description, price, rating, in_stock, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&new.name)
        .bind(&new.brand)
        .bind(&new.category)
        .bind(&new.description)
        .bind(round_price(new.price))
        .bind(new.rating.unwrap_or(0.0))
        .bind(new.in_stock.unwrap_or(true))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(product_id = row.id, "Product saved");
        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as("SELECT * FROM products ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn list_page(&self, offset: u64, limit: u64) -> Result<(Vec<Product>, u64)> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT * FROM products ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let total = self.count().await?;
        Ok((rows.into_iter().map(Product::from).collect(), total))
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            UPDATE products
            SET name = ?, brand = ?, category = ?, description = ?,
                price = ?, rating = ?, in_stock = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.category)
        .bind(&product.description)
        .bind(round_price(product.price))
        .bind(product.rating)
        .bind(product.in_stock)
        .bind(Utc::now())
        .bind(product.id)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_some() {
            tracing::debug!(product_id = product.id, "Product updated");
        }
        Ok(row.map(Product::from))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            tracing::debug!(product_id = id, "Product deleted");
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
