use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use lootshelf_core::store::{
    strip_reserved_keys, validate_field_name, Document, DocumentFilter, DocumentId, DocumentStore,
    StoreError, StoredDocument,
};

/// Process-local document store. Documents keep insertion order per collection.
pub struct InMemoryDocumentStore {
    collections: RwLock<BTreeMap<String, Vec<StoredDocument>>>,
    online: AtomicBool,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self { collections: RwLock::default(), online: AtomicBool::new(true) }
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the store going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.online.store(available, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".to_string()))
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn is_available(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        limit: u32,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.ensure_online()?;
        filter.validate()?;

        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(documents
            .iter()
            .filter(|document| filter.matches(&document.body))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find_one(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        self.ensure_online()?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|document| &document.id == id))
            .cloned())
    }

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>, StoreError> {
        self.ensure_online()?;
        validate_field_name(field)?;

        let collections = self.collections.read().await;
        let mut values: Vec<Value> = Vec::new();
        for document in collections.get(collection).into_iter().flatten() {
            if let Some(value) = document.body.get(field) {
                if !values.contains(value) {
                    values.push(value.clone());
                }
            }
        }
        Ok(values)
    }

    async fn insert_one(
        &self,
        collection: &str,
        body: Document,
    ) -> Result<DocumentId, StoreError> {
        self.ensure_online()?;

        let id = DocumentId::generate();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument { id, body: strip_reserved_keys(body) });
        Ok(id)
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        self.ensure_online()?;

        let collections = self.collections.read().await;
        Ok(collections.get(collection).map_or(0, |documents| documents.len() as u64))
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        self.ensure_online()?;

        let collections = self.collections.read().await;
        Ok(collections
            .iter()
            .filter(|(_, documents)| !documents.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }
}
