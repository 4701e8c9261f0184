use axum::{extract::State, Json};
use lootshelf_core::CatalogService;
use serde::Serialize;
use tracing::warn;

const ERROR_DETAIL_LIMIT: usize = 80;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LivenessResponse {
    pub message: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConnectivityReport {
    pub backend: &'static str,
    pub database: String,
    pub collections: Vec<String>,
}

pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { message: "Lootshelf API running" })
}

/// Always answers 200; the store's state is reported in the body.
pub async fn connectivity(State(catalog): State<CatalogService>) -> Json<ConnectivityReport> {
    let mut report = ConnectivityReport {
        backend: "running",
        database: "not connected".to_string(),
        collections: Vec::new(),
    };

    let Some(store) = catalog.store().filter(|store| store.is_available()) else {
        return Json(report);
    };

    match store.list_collections().await {
        Ok(collections) => {
            report.database = "connected".to_string();
            report.collections = collections;
        }
        Err(error) => {
            warn!(
                event_name = "system.health.store_probe_failed",
                correlation_id = "probe",
                error = %error,
                "document store probe failed"
            );
            let detail = error.to_string().chars().take(ERROR_DETAIL_LIMIT).collect::<String>();
            report.database = format!("error: {detail}");
        }
    }

    Json(report)
}
