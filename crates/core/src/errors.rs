use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// A single rejected input field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("invalid argument: {}", describe_violations(.0))]
    InvalidArgument(Vec<FieldViolation>),
    #[error("product `{0}` not found")]
    NotFound(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

impl CatalogError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument(vec![FieldViolation::new(field, message)])
    }
}

impl From<StoreError> for CatalogError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable(message) => Self::ServiceUnavailable(message),
            StoreError::Query(message) | StoreError::Decode(message) => Self::Persistence(message),
        }
    }
}

fn describe_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("{}: {}", violation.field, violation.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("unprocessable request: {message}")]
    Unprocessable { message: String, violations: Vec<FieldViolation>, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unprocessable { .. } => "The request failed validation. Check the listed fields.",
            Self::NotFound { .. } => "Product not found",
            Self::ServiceUnavailable { .. } => "Database not available",
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    /// HTTP status for the error. Store outages surface as 500 rather than 503.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unprocessable { .. } => 422,
            Self::NotFound { .. } => 404,
            Self::ServiceUnavailable { .. } | Self::Internal { .. } => 500,
        }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Self::Unprocessable { violations, .. } => violations,
            _ => &[],
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::Unprocessable { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl CatalogError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::Unprocessable { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<CatalogError> for InterfaceError {
    fn from(value: CatalogError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            CatalogError::InvalidArgument(violations) => Self::Unprocessable {
                message: describe_violations(&violations),
                violations,
                correlation_id,
            },
            CatalogError::NotFound(message) => Self::NotFound { message, correlation_id },
            CatalogError::ServiceUnavailable(message) => {
                Self::ServiceUnavailable { message, correlation_id }
            }
            CatalogError::Persistence(message) => Self::Internal { message, correlation_id },
        }
    }
}
