//! Catalog JSON API.
//!
//! - `GET  /api/products?q=&category=&platform=&limit=` lists products
//! - `GET  /api/products/{id}` fetches one product
//! - `POST /api/products` creates a product and returns its id
//! - `GET  /api/categories` / `GET /api/platforms` list distinct labels

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use lootshelf_core::catalog::ListParams;
use lootshelf_core::{
    CatalogError, CatalogService, FieldViolation, InterfaceError, Product, ProductId,
    ProductInput, ProductQuery,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::health;

pub fn router(catalog: CatalogService) -> Router {
    Router::new()
        .route("/", get(health::liveness))
        .route("/test", get(health::connectivity))
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/{id}", get(get_product))
        .route("/api/categories", get(list_categories))
        .route("/api/platforms", get(list_platforms))
        .layer(TraceLayer::new_for_http())
        .with_state(catalog)
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub detail: Vec<FieldViolation>,
    pub correlation_id: String,
}

/// Interface error carrying its own correlation id into the response.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl From<CatalogError> for ApiError {
    fn from(value: CatalogError) -> Self {
        let correlation_id = Uuid::new_v4().to_string();
        let interface = value.into_interface(correlation_id);

        match &interface {
            InterfaceError::NotFound { .. } | InterfaceError::Unprocessable { .. } => info!(
                event_name = "api.request.rejected",
                correlation_id = interface.correlation_id(),
                status = interface.status_code(),
                error = %interface,
                "request rejected"
            ),
            InterfaceError::ServiceUnavailable { .. } | InterfaceError::Internal { .. } => error!(
                event_name = "api.request.failed",
                correlation_id = interface.correlation_id(),
                status = interface.status_code(),
                error = %interface,
                "request failed"
            ),
        }

        Self(interface)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.0.user_message(),
            detail: self.0.violations().to_vec(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn list_products(
    State(catalog): State<CatalogService>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let Query(params) =
        params.map_err(|rejection| CatalogError::invalid("query", rejection.body_text()))?;
    let query = ProductQuery::from_params(params)?;
    Ok(Json(catalog.list(&query).await?))
}

pub async fn get_product(
    State(catalog): State<CatalogService>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(catalog.get(&id).await?))
}

pub async fn list_categories(
    State(catalog): State<CatalogService>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(catalog.list_categories().await?))
}

pub async fn list_platforms(
    State(catalog): State<CatalogService>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(catalog.list_platforms().await?))
}

pub async fn create_product(
    State(catalog): State<CatalogService>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<ProductId>, ApiError> {
    let Json(input) =
        payload.map_err(|rejection| CatalogError::invalid("body", rejection.body_text()))?;
    Ok(Json(catalog.create(input).await?))
}
