use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::FieldViolation;
use crate::store::{Document, StoredDocument};

/// Rating applied when a product is created or stored without one.
pub const DEFAULT_RATING: Decimal = Decimal::from_parts(45, 0, 0, false, 1);
/// Stock applied when a product is created or stored without one.
pub const DEFAULT_STOCK: u64 = 100;
pub const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Opaque product identifier as exposed to clients.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: String,
    pub platform: String,
    pub image_url: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub rating: Decimal,
    pub stock: u64,
}

/// Client-supplied fields for a new product. The identifier is never accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: String,
    pub platform: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub stock: Option<i64>,
}

impl ProductInput {
    /// Checks every product invariant and reports all violations at once.
    pub fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();

        if self.title.trim().is_empty() {
            violations.push(FieldViolation::new("title", "must not be empty"));
        }
        if self.category.trim().is_empty() {
            violations.push(FieldViolation::new("category", "must not be empty"));
        }
        if self.platform.trim().is_empty() {
            violations.push(FieldViolation::new("platform", "must not be empty"));
        }
        if self.price < Decimal::ZERO {
            violations.push(FieldViolation::new("price", "must be greater than or equal to 0"));
        }
        if let Some(rating) = self.rating {
            if rating < Decimal::ZERO || rating > MAX_RATING {
                violations.push(FieldViolation::new("rating", "must be between 0 and 5"));
            }
        }
        if let Some(stock) = self.stock {
            if stock < 0 {
                violations.push(FieldViolation::new("stock", "must be greater than or equal to 0"));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Builds the stored body with defaults applied. Call after [`ProductInput::validate`].
    pub fn into_document(self) -> Document {
        let rating = self.rating.unwrap_or(DEFAULT_RATING);
        let stock = self.stock.and_then(|stock| u64::try_from(stock).ok()).unwrap_or(DEFAULT_STOCK);

        let mut body = Document::new();
        body.insert("title".to_string(), Value::String(self.title));
        body.insert("description".to_string(), self.description.map_or(Value::Null, Value::String));
        body.insert("price".to_string(), decimal_to_json(self.price));
        body.insert("category".to_string(), Value::String(self.category));
        body.insert("platform".to_string(), Value::String(self.platform));
        body.insert("image_url".to_string(), self.image_url.map_or(Value::Null, Value::String));
        body.insert("rating".to_string(), decimal_to_json(rating));
        body.insert("stock".to_string(), Value::from(stock));
        body
    }
}

impl Product {
    /// Maps a stored record onto the output shape, filling rating and stock defaults.
    pub fn from_document(document: &StoredDocument) -> Result<Self, String> {
        let body = &document.body;

        Ok(Self {
            id: ProductId(document.id.to_string()),
            title: required_string(body, "title")?,
            description: optional_string(body, "description")?,
            price: required_decimal(body, "price")?,
            category: required_string(body, "category")?,
            platform: required_string(body, "platform")?,
            image_url: optional_string(body, "image_url")?,
            rating: optional_decimal(body, "rating")?.unwrap_or(DEFAULT_RATING),
            stock: optional_stock(body)?.unwrap_or(DEFAULT_STOCK),
        })
    }
}

fn present<'a>(body: &'a Document, field: &str) -> Option<&'a Value> {
    body.get(field).filter(|value| !value.is_null())
}

fn required_string(body: &Document, field: &str) -> Result<String, String> {
    optional_string(body, field)?.ok_or_else(|| format!("document is missing `{field}`"))
}

fn optional_string(body: &Document, field: &str) -> Result<Option<String>, String> {
    match present(body, field) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(format!("`{field}` should be a string, found {other}")),
    }
}

fn required_decimal(body: &Document, field: &str) -> Result<Decimal, String> {
    optional_decimal(body, field)?.ok_or_else(|| format!("document is missing `{field}`"))
}

fn optional_decimal(body: &Document, field: &str) -> Result<Option<Decimal>, String> {
    match present(body, field) {
        None => Ok(None),
        // Parse the JSON text rather than an f64 so 19.99 stays 19.99.
        Some(Value::Number(number)) => {
            let text = number.to_string();
            text.parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(&text))
                .map(|value| Some(value.normalize()))
                .map_err(|error| format!("`{field}` is not a decimal: {error}"))
        }
        Some(other) => Err(format!("`{field}` should be a number, found {other}")),
    }
}

fn optional_stock(body: &Document) -> Result<Option<u64>, String> {
    match present(body, "stock") {
        None => Ok(None),
        Some(Value::Number(number)) => number
            .as_u64()
            .map(Some)
            .ok_or_else(|| format!("`stock` should be a non-negative integer, found {number}")),
        Some(other) => Err(format!("`stock` should be a number, found {other}")),
    }
}

fn decimal_to_json(value: Decimal) -> Value {
    value
        .normalize()
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map_or(Value::Null, Value::Number)
}
