use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::{config::Config, state::AppState};

/// Name of the cookie that identifies a client's storage scope.
pub const CLIENT_COOKIE: &str = "saathi_client";

/// The storage scope a request belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientId(pub Uuid);

fn extract_client_id(cookies: &Cookies) -> Option<Uuid> {
    cookies
        .get(CLIENT_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Creates the client identity cookie.
fn client_cookie(client_id: Uuid, config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(CLIENT_COOKIE, client_id.to_string());

    cookie.set_http_only(true);
    if config.production {
        cookie.set_secure(true);
    }

    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_max_age(Duration::days(config.client_cookie_days));
    cookie.set_path("/");

    cookie
}

/// A middleware that attaches a [`ClientId`] to every request, issuing a
/// new identity cookie when the client has none.
pub async fn ensure_client(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let client_id = match extract_client_id(&cookies) {
        Some(client_id) => client_id,
        None => {
            let client_id = Uuid::new_v4();
            cookies.add(client_cookie(client_id, &state.config));
            tracing::debug!("🆕 Issued client id: {}", client_id);
            client_id
        }
    };

    request.extensions_mut().insert(ClientId(client_id));

    next.run(request).await
}
