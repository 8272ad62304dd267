use crate::config::{StateBackend, StateConfig};
use crate::error::{AppError, Result};
use crate::state::{CatalogStore, InMemoryStore, SqlStore};
use std::sync::Arc;

/// Create a catalog store based on configuration
pub async fn create_store(config: &StateConfig) -> Result<Arc<dyn CatalogStore>> {
    match config.backend {
        StateBackend::Sqlite => {
            let url = config.url.as_ref().ok_or_else(|| {
                AppError::Configuration("Sqlite backend requires 'url' configuration".to_string())
            })?;

            tracing::info!(url = %url, "Initializing SQLite storage backend");

            let store = SqlStore::connect(url, config.pool_size).await?;
            Ok(Arc::new(store))
        }

        StateBackend::Memory => Ok(create_in_memory_store()),
    }
}

/// Create an in-memory store (for testing and development)
pub fn create_in_memory_store() -> Arc<dyn CatalogStore> {
    tracing::info!("Initializing in-memory storage backend");
    Arc::new(InMemoryStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_sqlite_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = StateConfig {
            backend: StateBackend::Sqlite,
            url: Some(format!(
                "sqlite://{}",
                temp_dir.path().join("catalog.db").display()
            )),
            pool_size: 2,
        };

        let store = create_store(&config).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_in_memory_store() {
        let config = StateConfig {
            backend: StateBackend::Memory,
            url: None,
            pool_size: 1,
        };

        let store = create_store(&config).await.unwrap();
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_sqlite_requires_url() {
        let config = StateConfig {
            backend: StateBackend::Sqlite,
            url: None,
            pool_size: 1,
        };

        let result = create_store(&config).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
