use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    DASHBOARD_ROUTE, LOGIN_ROUTE,
    error::Result,
    middleware_layer::client::ClientId,
    models::session::Session,
    state::AppState,
};

/// The request payload for admin login.
///
/// Missing fields deserialize as empty so they are reported as missing
/// rather than as a malformed body.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    /// Route the client should navigate to next.
    pub redirect: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

/// Handles admin login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt - username: {:?}, role: {:?}", payload.username, payload.role);

    let session = state
        .session_store(client.0)
        .login(&payload.username, &payload.password, &payload.role)
        .await?;

    tracing::info!("✅ Admin logged in: {} as {}", session.username, session.role.label());

    let response = AuthResponse {
        success: true,
        message: format!("Logged in as {}", session.role),
        redirect: DASHBOARD_ROUTE,
        session: Some(session),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Returns the session of the signed-in admin.
pub async fn current_session(Extension(session): Extension<Session>) -> Json<Session> {
    Json(session)
}

/// Handles admin logout.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Extension(session): Extension<Session>,
) -> Result<Response> {
    tracing::info!("👋 Logout for admin: {}", session.username);

    state.session_store(client.0).logout().await?;

    let response = AuthResponse {
        success: true,
        message: "Logout successful".to_string(),
        redirect: LOGIN_ROUTE,
        session: None,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}
