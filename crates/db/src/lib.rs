pub mod connection;
pub mod migrations;
pub mod store;

pub use connection::{connect_with_settings, is_in_memory_url, DbPool};
pub use store::{open_store, InMemoryDocumentStore, OpenStoreError, SqliteDocumentStore};
