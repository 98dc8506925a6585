use crate::{
    error::Result,
    repositories::storage::{LocalStorage, OFFLINE_MODE_KEY},
};

/// Reads the offline-mode flag. Anything other than `"true"` is off.
pub async fn is_offline_mode(storage: &dyn LocalStorage) -> Result<bool> {
    let value = storage.get_item(OFFLINE_MODE_KEY).await?;
    Ok(value.as_deref() == Some("true"))
}

/// Writes the offline-mode flag.
pub async fn set_offline_mode(storage: &dyn LocalStorage, enabled: bool) -> Result<()> {
    let value = if enabled { "true" } else { "false" };
    storage.set_item(OFFLINE_MODE_KEY, value).await
}
