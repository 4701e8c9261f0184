use lootshelf_core::catalog::{seed_if_empty, SeedOutcome};
use lootshelf_core::config::{AppConfig, ConfigError};
use lootshelf_core::{CatalogService, StoreError};
use lootshelf_db::{open_store, OpenStoreError};
use thiserror::Error;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub catalog: CatalogService,
    pub seed: Option<SeedOutcome>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(OpenStoreError),
    #[error("catalog seeding failed: {0}")]
    Seed(#[source] StoreError),
}

#[cfg(test)]
pub async fn bootstrap(
    options: lootshelf_core::config::LoadOptions,
) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    // An unreachable database keeps the process up; catalog routes then answer 500.
    let catalog = match open_store(&config.database).await {
        Ok(store) => CatalogService::new(store),
        Err(OpenStoreError::Connect(error)) => {
            warn!(
                event_name = "system.bootstrap.store_unavailable",
                correlation_id = "bootstrap",
                error = %error,
                "document store unreachable, serving without a database"
            );
            CatalogService::unavailable()
        }
        Err(error) => return Err(BootstrapError::Store(error)),
    };

    let seed = match (config.catalog.seed_on_startup, catalog.store()) {
        (true, Some(store)) => {
            Some(seed_if_empty(&**store).await.map_err(BootstrapError::Seed)?)
        }
        (true, None) => Some(SeedOutcome::StoreUnavailable),
        (false, _) => None,
    };

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        seed = ?seed,
        "application bootstrap complete"
    );

    Ok(Application { config, catalog, seed })
}
