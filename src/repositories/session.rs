use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    error::Result,
    models::session::Session,
    repositories::storage::{ADMIN_AUTH_KEY, LocalStorage},
};

/// Persistence for the single admin session of a client.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Returns the stored session when present and well-formed.
    async fn load(&self) -> Result<Option<Session>>;
    /// Stores `session`, overwriting any previous one.
    async fn save(&self, session: &Session) -> Result<()>;
    /// Removes the stored session.
    async fn clear(&self) -> Result<()>;
}

/// [`SessionRepository`] backed by a client's [`LocalStorage`].
#[derive(Clone)]
pub struct StorageSessionRepository {
    storage: Arc<dyn LocalStorage>,
}

impl StorageSessionRepository {
    /// Creates a repository over `storage`.
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl SessionRepository for StorageSessionRepository {
    async fn load(&self) -> Result<Option<Session>> {
        let Some(session_json) = self.storage.get_item(ADMIN_AUTH_KEY).await? else {
            return Ok(None);
        };

        let session: Session = match sonic_rs::from_str(&session_json) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("❌ Invalid session JSON: {}", e);
                return Ok(None);
            }
        };

        if !session.is_authenticated {
            tracing::warn!("❌ Stored session for {} is not authenticated", session.username);
            return Ok(None);
        }

        Ok(Some(session))
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let session_json = sonic_rs::to_string(session)?;
        self.storage.set_item(ADMIN_AUTH_KEY, &session_json).await
    }

    async fn clear(&self) -> Result<()> {
        self.storage.remove_item(ADMIN_AUTH_KEY).await
    }
}
