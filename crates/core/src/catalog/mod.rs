pub mod query;
pub mod seed;
pub mod service;

pub use query::{ListParams, ProductQuery, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};
pub use seed::{sample_products, seed_if_empty, SeedOutcome};
pub use service::{CatalogService, PRODUCT_COLLECTION};
