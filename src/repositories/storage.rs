use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;

/// Key holding the JSON-encoded admin session.
pub const ADMIN_AUTH_KEY: &str = "adminAuth";
/// Key holding the offline-mode flag (`"true"` / `"false"`).
pub const OFFLINE_MODE_KEY: &str = "offlineMode";

/// String-valued key-value storage scoped to a single client.
#[async_trait]
pub trait LocalStorage: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
    /// Removes `key`. Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<()>;
}

fn scoped_key(namespace: &str, key: &str) -> String {
    format!("storage:{}:{}", namespace, key)
}

/// Client storage kept in Redis.
#[derive(Clone)]
pub struct RedisStorage {
    redis: ConnectionManager,
    namespace: String,
}

impl RedisStorage {
    /// Creates storage for `namespace` on an existing connection manager.
    pub fn new(redis: ConnectionManager, namespace: impl Into<String>) -> Self {
        Self {
            redis,
            namespace: namespace.into(),
        }
    }
}

#[async_trait]
impl LocalStorage for RedisStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = self
            .redis
            .clone()
            .get(scoped_key(&self.namespace, key))
            .await?;
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _: () = self
            .redis
            .clone()
            .set(scoped_key(&self.namespace, key), value)
            .await
            .map_err(|e| {
                tracing::error!("❌ Redis set failed for {}: {}", key, e);
                e
            })?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let _: () = self
            .redis
            .clone()
            .del(scoped_key(&self.namespace, key))
            .await?;
        Ok(())
    }
}

/// Client storage kept in process memory.
///
/// Clones share the same map; each clone only sees its own namespace.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
    namespace: String,
}

impl MemoryStorage {
    /// Creates an empty store with an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the same map scoped to `namespace`.
    pub fn scoped(&self, namespace: impl Into<String>) -> Self {
        Self {
            items: self.items.clone(),
            namespace: namespace.into(),
        }
    }

    /// Number of entries across all namespaces.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Returns `true` when no namespace holds any entry.
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl LocalStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.read().await;
        Ok(items.get(&scoped_key(&self.namespace, key)).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.write().await;
        items.insert(scoped_key(&self.namespace, key), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.write().await;
        items.remove(&scoped_key(&self.namespace, key));
        Ok(())
    }
}

/// Where client storage lives.
#[derive(Clone)]
pub enum StorageBackend {
    /// Shared Redis instance.
    Redis(ConnectionManager),
    /// In-process map; lost on restart.
    Memory(MemoryStorage),
}

impl StorageBackend {
    /// Returns the storage scope belonging to `client_id`.
    pub fn for_client(&self, client_id: Uuid) -> Arc<dyn LocalStorage> {
        let namespace = client_id.to_string();
        match self {
            StorageBackend::Redis(redis) => Arc::new(RedisStorage::new(redis.clone(), namespace)),
            StorageBackend::Memory(memory) => Arc::new(memory.scoped(namespace)),
        }
    }

    /// Short name used in startup logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageBackend::Redis(_) => "redis",
            StorageBackend::Memory(_) => "memory",
        }
    }
}
