use std::sync::Arc;

use tracing::info;

use crate::{
    auth::UserRepo,
    catalog::CatalogRepo,
    config::{AppConfig, StorageBackend},
    db::PgStore,
    groups::{GroupRepo, InviteNotifier, LogNotifier},
    memory::MemoryStore,
    nutrition::NutritionRepo,
    weight::WeightRepo,
    workouts::SetLogRepo,
};

/// Shared handles for handlers; every collaborator is injected, none is global.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub catalog: Arc<dyn CatalogRepo>,
    pub sets: Arc<dyn SetLogRepo>,
    pub groups: Arc<dyn GroupRepo>,
    pub weights: Arc<dyn WeightRepo>,
    pub nutrition: Arc<dyn NutritionRepo>,
    pub notifier: Arc<dyn InviteNotifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        match config.storage {
            StorageBackend::Postgres => {
                let store = Arc::new(PgStore::connect(&config).await?);
                Ok(Self::from_store(config, store, Arc::new(LogNotifier)))
            }
            StorageBackend::Memory => {
                info!("using in-memory storage; data is lost on exit");
                Ok(Self::in_memory(config))
            }
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::from_store(config, Arc::new(MemoryStore::new()), Arc::new(LogNotifier))
    }

    /// Wires one store into every repository slot.
    pub fn from_store<S>(config: AppConfig, store: Arc<S>, notifier: Arc<dyn InviteNotifier>) -> Self
    where
        S: UserRepo + CatalogRepo + SetLogRepo + GroupRepo + WeightRepo + NutritionRepo + 'static,
    {
        Self {
            config: Arc::new(config),
            users: store.clone(),
            catalog: store.clone(),
            sets: store.clone(),
            groups: store.clone(),
            weights: store.clone(),
            nutrition: store,
            notifier,
        }
    }
}
