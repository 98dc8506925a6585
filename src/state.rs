use redis::aio::ConnectionManager;
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::repositories::storage::{MemoryStorage, StorageBackend};
use crate::services::session::SessionStore;
use crate::services::simulator::{EntropyRandom, RandomSource};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// Where client storage lives.
    pub storage: StorageBackend,
    /// The application's configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new `AppState`, connecting to Redis when configured.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let storage = match config.redis_url.as_deref() {
            Some(redis_url) => {
                let redis_client = redis::Client::open(redis_url)?;
                let redis = ConnectionManager::new(redis_client).await?;
                tracing::info!("✅ Redis Connection Manager initialized");
                StorageBackend::Redis(redis)
            }
            None => {
                tracing::warn!("⚠️ REDIS_URL not set, client storage is kept in memory");
                StorageBackend::Memory(MemoryStorage::new())
            }
        };

        Ok(Self::with_storage(config.clone(), storage))
    }

    /// Creates an `AppState` over an existing storage backend.
    pub fn with_storage(config: Config, storage: StorageBackend) -> Self {
        Self { storage, config }
    }

    /// The session store of `client_id`.
    pub fn session_store(&self, client_id: Uuid) -> SessionStore {
        SessionStore::new(self.storage.for_client(client_id))
    }

    /// A fresh random source for one simulator.
    pub fn random_source(&self) -> Box<dyn RandomSource> {
        match self.config.stats_random_seed {
            Some(seed) => Box::new(EntropyRandom::seeded(seed)),
            None => Box::new(EntropyRandom::new()),
        }
    }
}
