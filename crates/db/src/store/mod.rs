use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use lootshelf_core::config::{DatabaseConfig, StoreBackend};
use lootshelf_core::store::DocumentStore;

use crate::{connect_with_settings, migrations};

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

#[derive(Debug, Error)]
pub enum OpenStoreError {
    #[error("unsupported database url `{0}`")]
    UnsupportedUrl(String),
    #[error("database connection failed: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

/// Connects the configured backend and brings its schema up to date.
pub async fn open_store(
    database: &DatabaseConfig,
) -> Result<Arc<dyn DocumentStore>, OpenStoreError> {
    match database.backend() {
        Some(StoreBackend::Memory) => {
            info!(
                event_name = "system.store.opened",
                correlation_id = "bootstrap",
                backend = "memory",
                "in-memory document store ready"
            );
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        Some(StoreBackend::Sqlite) => {
            let pool = connect_with_settings(
                &database.url,
                database.max_connections,
                database.timeout_secs,
            )
            .await
            .map_err(OpenStoreError::Connect)?;
            migrations::run_pending(&pool).await.map_err(OpenStoreError::Migration)?;

            info!(
                event_name = "system.store.opened",
                correlation_id = "bootstrap",
                backend = "sqlite",
                "sqlite document store ready"
            );
            Ok(Arc::new(SqliteDocumentStore::new(pool)))
        }
        None => Err(OpenStoreError::UnsupportedUrl(database.url.clone())),
    }
}

#[cfg(test)]
mod tests {
    use lootshelf_core::config::DatabaseConfig;

    use super::{open_store, OpenStoreError};

    fn database(url: &str) -> DatabaseConfig {
        DatabaseConfig { url: url.to_string(), max_connections: 1, timeout_secs: 5 }
    }

    #[tokio::test]
    async fn memory_url_opens_in_memory_store() {
        let store = open_store(&database("memory://")).await.expect("open");
        assert!(store.is_available());
        assert_eq!(store.count("product").await.expect("count"), 0);
    }

    #[tokio::test]
    async fn sqlite_url_opens_migrated_store() {
        let store = open_store(&database("sqlite::memory:")).await.expect("open");
        assert_eq!(store.count("product").await.expect("count"), 0);
    }

    #[tokio::test]
    async fn unsupported_url_is_rejected() {
        let result = open_store(&database("mongodb://localhost")).await;
        assert!(matches!(result, Err(OpenStoreError::UnsupportedUrl(_))));
    }
}
