use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog::query::ProductQuery;
use crate::domain::product::{Product, ProductId, ProductInput};
use crate::errors::CatalogError;
use crate::store::{DocumentId, DocumentStore, StoredDocument};

pub const PRODUCT_COLLECTION: &str = "product";

/// Catalog query service over an injected document store.
///
/// Every operation first checks that the store is reachable and fails with
/// [`CatalogError::ServiceUnavailable`] otherwise. Each call makes at most one
/// store round trip.
#[derive(Clone)]
pub struct CatalogService {
    store: Option<Arc<dyn DocumentStore>>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store: Some(store) }
    }

    /// A service with no backing store; every operation reports unavailability.
    pub fn unavailable() -> Self {
        Self { store: None }
    }

    pub fn store(&self) -> Option<&Arc<dyn DocumentStore>> {
        self.store.as_ref()
    }

    fn connected_store(&self) -> Result<&dyn DocumentStore, CatalogError> {
        match &self.store {
            Some(store) if store.is_available() => Ok(&**store),
            Some(_) => Err(CatalogError::ServiceUnavailable("document store is unreachable".into())),
            None => Err(CatalogError::ServiceUnavailable("document store is not configured".into())),
        }
    }

    pub async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, CatalogError> {
        let store = self.connected_store()?;
        let filter = query.to_filter();

        let documents = store.find_many(PRODUCT_COLLECTION, &filter, query.limit).await?;
        let products = documents.iter().map(map_document).collect::<Result<Vec<_>, _>>()?;

        debug!(
            event_name = "catalog.products.listed",
            search = query.search.as_deref().unwrap_or(""),
            category = query.category.as_deref().unwrap_or(""),
            platform = query.platform.as_deref().unwrap_or(""),
            limit = query.limit,
            returned = products.len(),
            "listed products"
        );
        Ok(products)
    }

    pub async fn get(&self, identifier: &str) -> Result<Product, CatalogError> {
        let store = self.connected_store()?;
        let not_found = || CatalogError::NotFound(identifier.to_string());

        let Some(id) = DocumentId::parse(identifier) else {
            debug!(
                event_name = "catalog.products.malformed_id",
                product_id = identifier,
                "identifier is not a store id, treating as missing"
            );
            return Err(not_found());
        };

        let document = store.find_one(PRODUCT_COLLECTION, &id).await?.ok_or_else(not_found)?;
        map_document(&document)
    }

    pub async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        self.distinct_labels("category").await
    }

    pub async fn list_platforms(&self) -> Result<Vec<String>, CatalogError> {
        self.distinct_labels("platform").await
    }

    async fn distinct_labels(&self, field: &str) -> Result<Vec<String>, CatalogError> {
        let store = self.connected_store()?;
        let values = store.distinct(PRODUCT_COLLECTION, field).await?;
        Ok(sorted_labels(values))
    }

    pub async fn create(&self, input: ProductInput) -> Result<ProductId, CatalogError> {
        input.validate().map_err(CatalogError::InvalidArgument)?;
        let store = self.connected_store()?;

        let id = store.insert_one(PRODUCT_COLLECTION, input.into_document()).await?;
        info!(
            event_name = "catalog.products.created",
            product_id = %id,
            "product created"
        );
        Ok(ProductId(id.to_string()))
    }
}

fn map_document(document: &StoredDocument) -> Result<Product, CatalogError> {
    Product::from_document(document).map_err(|reason| {
        warn!(
            event_name = "catalog.products.decode_failed",
            product_id = %document.id,
            reason = %reason,
            "stored product could not be mapped"
        );
        CatalogError::Persistence(format!("product {} is malformed: {reason}", document.id))
    })
}

/// Keeps non-empty string values, deduplicated and in ascending order.
fn sorted_labels(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::String(label) if !label.is_empty() => Some(label),
            _ => None,
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
