//! Port over the document database backing the catalog.
//!
//! The catalog only ever talks to storage through [`DocumentStore`]; adapters
//! live in `lootshelf-db`. Identifiers, filters and errors are defined here so
//! that no adapter's native types leak into the service contract.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Loosely-typed document body as stored.
pub type Document = Map<String, Value>;

/// Keys that carry identity and are never accepted from a caller's body.
pub const RESERVED_KEYS: &[&str] = &["_id", "id"];

/// Store-assigned document identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns `None` for anything that is not a well-formed identifier.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::try_parse(raw.trim()).ok().map(Self)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub body: Document,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Exact, case-sensitive string equality.
    Equals { field: String, value: String },
    /// Literal substring containment ignoring case. The needle is never a pattern.
    ContainsIgnoreCase { field: String, needle: String },
}

impl Condition {
    pub fn field(&self) -> &str {
        match self {
            Self::Equals { field, .. } | Self::ContainsIgnoreCase { field, .. } => field,
        }
    }

    /// Evaluates the condition against a document body. Non-string fields never match.
    pub fn matches(&self, body: &Document) -> bool {
        match self {
            Self::Equals { field, value } => {
                body.get(field).and_then(Value::as_str).is_some_and(|stored| stored == value)
            }
            Self::ContainsIgnoreCase { field, needle } => {
                body.get(field).and_then(Value::as_str).is_some_and(|stored| {
                    stored.to_lowercase().contains(&needle.to_lowercase())
                })
            }
        }
    }
}

/// Conjunction of conditions. An empty filter matches every document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    conditions: Vec<Condition>,
}

impl DocumentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Equals { field: field.into(), value: value.into() });
        self
    }

    pub fn contains_ignore_case(
        mut self,
        field: impl Into<String>,
        needle: impl Into<String>,
    ) -> Self {
        self.conditions
            .push(Condition::ContainsIgnoreCase { field: field.into(), needle: needle.into() });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, body: &Document) -> bool {
        self.conditions.iter().all(|condition| condition.matches(body))
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        self.conditions.iter().try_for_each(|condition| validate_field_name(condition.field()))
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("document store query failed: {0}")]
    Query(String),
    #[error("document decode failed: {0}")]
    Decode(String),
}

/// Field names are plain identifiers so adapters can embed them in paths safely.
pub fn validate_field_name(field: &str) -> Result<(), StoreError> {
    let mut chars = field.chars();
    let valid_head = chars.next().is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    if valid_head && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        Ok(())
    } else {
        Err(StoreError::Query(format!("invalid field name `{field}`")))
    }
}

/// Drops identity keys from a caller-supplied body before insertion.
pub fn strip_reserved_keys(mut body: Document) -> Document {
    for key in RESERVED_KEYS {
        body.remove(*key);
    }
    body
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Whether the handle can currently reach the store.
    fn is_available(&self) -> bool;

    async fn find_many(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        limit: u32,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError>;

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>, StoreError>;

    async fn insert_one(&self, collection: &str, body: Document)
        -> Result<DocumentId, StoreError>;

    async fn count(&self, collection: &str) -> Result<u64, StoreError>;

    async fn list_collections(&self) -> Result<Vec<String>, StoreError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{strip_reserved_keys, validate_field_name, Document, DocumentFilter, DocumentId};

    fn body(value: serde_json::Value) -> Document {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn document_id_parse_fails_closed_on_malformed_input() {
        assert!(DocumentId::parse("not-an-id").is_none());
        assert!(DocumentId::parse("").is_none());
        assert!(DocumentId::parse("507f1f77bcf86cd799439011").is_none());

        let id = DocumentId::generate();
        assert_eq!(DocumentId::parse(&id.to_string()), Some(id));
    }

    #[test]
    fn contains_condition_treats_pattern_characters_literally() {
        let doc = body(json!({ "title": "Elden Ring Runes (PC)" }));

        assert!(DocumentFilter::new().contains_ignore_case("title", "RING").matches(&doc));
        assert!(DocumentFilter::new().contains_ignore_case("title", "(pc)").matches(&doc));
        assert!(!DocumentFilter::new().contains_ignore_case("title", "r.ng").matches(&doc));
        assert!(!DocumentFilter::new().contains_ignore_case("title", "%").matches(&doc));
    }

    #[test]
    fn equality_condition_is_case_sensitive_and_string_only() {
        let doc = body(json!({ "category": "Currency", "stock": 5 }));

        assert!(DocumentFilter::new().equals("category", "Currency").matches(&doc));
        assert!(!DocumentFilter::new().equals("category", "currency").matches(&doc));
        assert!(!DocumentFilter::new().equals("stock", "5").matches(&doc));
        assert!(!DocumentFilter::new().equals("missing", "x").matches(&doc));
    }

    #[test]
    fn conditions_combine_with_and() {
        let doc = body(json!({ "category": "Currency", "platform": "PC" }));
        let filter = DocumentFilter::new().equals("category", "Currency").equals("platform", "PS5");

        assert!(!filter.matches(&doc));
        assert!(DocumentFilter::new().matches(&doc));
    }

    #[test]
    fn field_names_must_be_identifiers() {
        assert!(validate_field_name("image_url").is_ok());
        assert!(validate_field_name("_id").is_ok());
        assert!(validate_field_name("").is_err());
        assert!(validate_field_name("a.b").is_err());
        assert!(validate_field_name("1abc").is_err());
        assert!(DocumentFilter::new().equals("$.x", "y").validate().is_err());
    }

    #[test]
    fn reserved_keys_are_stripped() {
        let stripped = strip_reserved_keys(body(json!({ "_id": "x", "id": "y", "title": "t" })));

        assert_eq!(stripped.len(), 1);
        assert!(stripped.contains_key("title"));
    }
}
