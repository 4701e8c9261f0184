pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod store;

pub use catalog::{CatalogService, ProductQuery, SeedOutcome};
pub use domain::product::{Product, ProductId, ProductInput};
pub use errors::{CatalogError, FieldViolation, InterfaceError};
pub use store::{DocumentFilter, DocumentId, DocumentStore, StoreError, StoredDocument};
