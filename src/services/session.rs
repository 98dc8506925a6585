use chrono::Utc;
use std::sync::Arc;

use crate::error::Result;
use crate::models::session::Session;
use crate::repositories::preferences;
use crate::repositories::session::{SessionRepository, StorageSessionRepository};
use crate::repositories::storage::LocalStorage;
use crate::validation::auth::validate_login_form;

/// The admin session of one client.
///
/// Owns no state of its own: the record lives in the injected repository,
/// the offline flag in the client's storage.
#[derive(Clone)]
pub struct SessionStore {
    repository: Arc<dyn SessionRepository>,
    storage: Arc<dyn LocalStorage>,
}

impl SessionStore {
    /// Creates a store whose session and flags both live in `storage`.
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            repository: Arc::new(StorageSessionRepository::new(storage.clone())),
            storage,
        }
    }

    /// Creates a store with a custom session repository.
    pub fn with_repository(
        repository: Arc<dyn SessionRepository>,
        storage: Arc<dyn LocalStorage>,
    ) -> Self {
        Self { repository, storage }
    }

    /// Signs an admin in.
    ///
    /// # Arguments
    ///
    /// * `username` - Free-form, must be non-empty.
    /// * `password` - Must be non-empty. Never checked against anything and
    ///   never stored.
    /// * `role` - Wire value of the selected role.
    ///
    /// # Returns
    ///
    /// The stored `Session`. On a validation failure nothing is written.
    pub async fn login(&self, username: &str, password: &str, role: &str) -> Result<Session> {
        let role = validate_login_form(username, password, role)?;

        let session = Session::new(username, role, Utc::now().timestamp_millis());
        self.repository.save(&session).await?;

        tracing::info!("✅ Admin session stored for {} ({})", session.username, session.role);
        Ok(session)
    }

    /// Returns the stored session, if any. No expiry is applied.
    pub async fn read_session(&self) -> Result<Option<Session>> {
        self.repository.load().await
    }

    /// Removes the stored session.
    pub async fn logout(&self) -> Result<()> {
        self.repository.clear().await?;
        tracing::info!("👋 Admin session cleared");
        Ok(())
    }

    /// Whether the offline-mode banner should be shown.
    pub async fn is_offline_mode_enabled(&self) -> Result<bool> {
        preferences::is_offline_mode(self.storage.as_ref()).await
    }

    /// Toggles the offline-mode flag.
    pub async fn set_offline_mode(&self, enabled: bool) -> Result<()> {
        preferences::set_offline_mode(self.storage.as_ref(), enabled).await?;
        tracing::debug!("Offline mode set to {}", enabled);
        Ok(())
    }
}
