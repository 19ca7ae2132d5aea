//! Bootstrap: adapters chosen from configuration

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use profile_core::repositories::{IdentityService, ProfileStore};
use profile_core::services::ProfileSync;
use profile_infrastructure::{create_pool, InMemoryIdentityService, InMemoryProfileStore, PgProfileStore};
use profile_shared::config::StoreBackend;
use profile_shared::telemetry::init_telemetry;
use profile_shared::AppConfig;

use crate::app::App;

pub type SharedSync = Arc<ProfileSync<dyn IdentityService, dyn ProfileStore>>;

/// Services shared by every view model
#[derive(Clone)]
pub struct AppContext {
    pub sync: SharedSync,
}

impl AppContext {
    pub fn new(identity: Arc<dyn IdentityService>, store: Arc<dyn ProfileStore>) -> Self {
        Self {
            sync: Arc::new(ProfileSync::new(identity, store)),
        }
    }

    /// Identity is always the in-process provider. The document store follows
    /// `store.backend`.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let identity: Arc<dyn IdentityService> = Arc::new(InMemoryIdentityService::new());

        let store: Arc<dyn ProfileStore> = match config.store.backend {
            StoreBackend::Memory => {
                info!("Using in-memory profile store");
                Arc::new(InMemoryProfileStore::new())
            }
            StoreBackend::Postgres => {
                let url = config
                    .store
                    .url
                    .as_deref()
                    .ok_or_else(|| anyhow!("store.url is required for the postgres backend"))?;
                let pool = create_pool(url, config.store.max_connections)
                    .await
                    .context("Failed to connect to profile database")?;
                let store = PgProfileStore::new(pool);
                store.ensure_schema().await?;
                info!("Using PostgreSQL profile store");
                Arc::new(store)
            }
        };

        Ok(Self::new(identity, store))
    }
}

/// Loads configuration, installs logging and builds the app.
///
/// Keep the returned guard alive for as long as file logging should flush.
pub async fn bootstrap() -> Result<(App, Option<WorkerGuard>)> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    let guard = init_telemetry(&config.logging)?;

    info!("Starting {} ({})", config.app.name, config.app.env);
    let context = AppContext::from_config(&config).await?;
    Ok((App::new(context), guard))
}
