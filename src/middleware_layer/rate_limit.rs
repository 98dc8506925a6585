use axum::Router;
use std::sync::Arc;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};

use crate::{config::LoginRateLimit, state::AppState};

/// Applies per-IP login throttling to `router`.
///
/// Requests must carry `ConnectInfo<SocketAddr>`, so the server has to be
/// started with `into_make_service_with_connect_info`.
pub fn limit_login(
    router: Router<AppState>,
    limit: Option<LoginRateLimit>,
) -> Router<AppState> {
    let Some(limit) = limit else {
        tracing::info!("Login rate limiting disabled");
        return router;
    };

    let Some(governor_conf) = GovernorConfigBuilder::default()
        .per_second(limit.per_second)
        .burst_size(limit.burst)
        .use_headers()
        .finish()
    else {
        tracing::warn!("⚠️ Invalid login rate limit {:?}, throttling disabled", limit);
        return router;
    };

    tracing::info!(
        "✅ Login rate limit: burst {} per {}s",
        limit.burst,
        limit.per_second
    );

    router.layer(GovernorLayer::new(Arc::new(governor_conf)))
}
