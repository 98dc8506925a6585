use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension,
};

use crate::{
    LOGIN_ROUTE,
    middleware_layer::client::ClientId,
    state::AppState,
};

/// A middleware that requires a stored admin session.
///
/// Clients without one are sent to the login route. The session is made
/// available to handlers as an `Extension<Session>`.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `client` - The client the request belongs to.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
pub async fn require_session(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!("🔐 Checking session for client {}", client.0);

    match state.session_store(client.0).read_session().await {
        Ok(Some(session)) => {
            tracing::debug!("✅ Session found: {} ({})", session.username, session.role);
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Ok(None) => {
            tracing::warn!("❌ No session for client {}, redirecting to login", client.0);
            Redirect::to(LOGIN_ROUTE).into_response()
        }
        Err(e) => e.into_response(),
    }
}
