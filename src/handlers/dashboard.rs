use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use chrono::Utc;
use futures::stream::{self, Stream};
use serde::Serialize;
use std::convert::Infallible;

use crate::{
    error::Result,
    middleware_layer::client::ClientId,
    models::{dashboard::DashboardStats, session::Session},
    services::simulator::LiveStatsSimulator,
    state::AppState,
};

/// Everything the dashboard needs on entry.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub session: Session,
    pub offline_mode: bool,
    pub stats: DashboardStats,
    pub tick_seconds: u64,
}

/// Returns the dashboard entry payload.
#[axum::debug_handler]
pub async fn overview(
    State(state): State<AppState>,
    Extension(client): Extension<ClientId>,
    Extension(session): Extension<Session>,
) -> Result<Json<DashboardOverview>> {
    let offline_mode = state
        .session_store(client.0)
        .is_offline_mode_enabled()
        .await?;

    Ok(Json(DashboardOverview {
        session,
        offline_mode,
        stats: DashboardStats::seed(Utc::now()),
        tick_seconds: state.config.stats_tick.as_secs(),
    }))
}

fn stats_event(stats: &DashboardStats) -> Event {
    match sonic_rs::to_string(stats) {
        Ok(json) => Event::default().event("stats").data(json),
        Err(e) => {
            tracing::error!("❌ Stats serialization failed: {}", e);
            Event::default().event("error").data("Serialization error")
        }
    }
}

/// Streams live stats as server-sent events.
///
/// Each connection mounts its own simulator. The current snapshot is sent
/// first, then one event per tick. The simulator is dropped together with
/// the stream when the client goes away.
pub async fn stats_stream(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    tracing::info!("📡 Live stats mounted for {}", session.username);

    let handle = LiveStatsSimulator::initialize(
        DashboardStats::seed(Utc::now()),
        state.config.stats_tick,
        state.random_source(),
    );
    let mut observer = handle.subscribe();
    let first = observer.latest();

    let events = stream::unfold(
        (handle, observer, Some(first)),
        |(handle, mut observer, pending)| async move {
            let stats = match pending {
                Some(stats) => stats,
                None => observer.next().await?,
            };
            Some((
                Ok::<_, Infallible>(stats_event(&stats)),
                (handle, observer, None),
            ))
        },
    );

    Sse::new(events).keep_alive(KeepAlive::default())
}
