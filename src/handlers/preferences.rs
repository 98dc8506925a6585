use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::{error::Result, middleware_layer::client::ClientId, state::AppState};

#[derive(Deserialize, Debug)]
pub struct OfflineModeRequest {
    pub enabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineModeResponse {
    pub offline_mode: bool,
}

/// Reports whether offline mode is on for this client.
pub async fn get_offline_mode(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
) -> Result<Json<OfflineModeResponse>> {
    let offline_mode = state
        .session_store(client.0)
        .is_offline_mode_enabled()
        .await?;

    Ok(Json(OfflineModeResponse { offline_mode }))
}

/// Turns offline mode on or off for this client.
pub async fn set_offline_mode(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Json(payload): Json<OfflineModeRequest>,
) -> Result<Json<OfflineModeResponse>> {
    tracing::info!("📴 Offline mode -> {} for client {}", payload.enabled, client.0);

    state
        .session_store(client.0)
        .set_offline_mode(payload.enabled)
        .await?;

    Ok(Json(OfflineModeResponse {
        offline_mode: payload.enabled,
    }))
}
