//! Admin backend for the Simhastha Saathi crowd-safety dashboard.
//!
//! Serves the admin login, a per-client session store and a live stats
//! feed driven by a bounded random walk.

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use http::{HeaderValue, Method, header};
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod config;
pub mod error;
pub mod state;

pub mod models {
    pub mod dashboard;
    pub mod session;
}

pub mod repositories {
    pub mod preferences;
    pub mod session;
    pub mod storage;
}

pub mod services {
    pub mod session;
    pub mod simulator;
}

pub mod handlers {
    pub mod auth;
    pub mod dashboard;
    pub mod preferences;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod client;
    pub mod rate_limit;
}

pub mod validation {
    pub mod auth;
}

use state::AppState;

/// Client route of the login screen.
pub const LOGIN_ROUTE: &str = "/admin/login";
/// Client route of the dashboard.
pub const DASHBOARD_ROUTE: &str = "/admin/dashboard";

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️ Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

/// Builds the HTTP application.
pub fn app(state: AppState) -> Router {
    let login_routes = middleware_layer::rate_limit::limit_login(
        Router::new().route("/api/admin/login", post(handlers::auth::login)),
        state.config.login_rate_limit,
    );

    let public_routes = Router::new().route(
        "/api/admin/offline-mode",
        get(handlers::preferences::get_offline_mode)
            .put(handlers::preferences::set_offline_mode),
    );

    let protected_routes = Router::new()
        .route("/api/admin/session", get(handlers::auth::current_session))
        .route("/api/admin/logout", post(handlers::auth::logout))
        .route("/api/admin/dashboard", get(handlers::dashboard::overview))
        .route(
            "/api/admin/dashboard/stats",
            get(handlers::dashboard::stats_stream),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_session,
        ));

    Router::new()
        .merge(login_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::client::ensure_client,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
