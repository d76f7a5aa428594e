// HTTP handlers and routing.

use axum::extract::State as AxumState;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::app::AppState;
use crate::store::StandingsStore;
use crate::utils::{monotonic_ms, now_epoch_ms};
use crate::ws::ws_handler;

mod types;
pub use types::*;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/standings", get(get_standings))
        .route("/config", get(get_overlay_config))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn get_standings(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let now_ms = monotonic_ms(app_state.start_instant);
    Json(standings_snapshot(&app_state.store, now_ms).await)
}

async fn get_overlay_config(AxumState(app_state): AxumState<AppState>) -> impl IntoResponse {
    let config = app_state.config.as_ref();
    Json(OverlayConfigResponse {
        fps: config.fps,
        alpha: config.alpha,
        idle_reset_ms: config.idle_reset_ms,
        layout: config.layout,
    })
}

pub async fn standings_snapshot(store: &StandingsStore, now_ms: u64) -> StandingsResponse {
    let (horses, ingest) = store.read_with_stats().await;
    let age_ms = ingest
        .last_publish_ms
        .map(|last| now_ms.saturating_sub(last));
    StandingsResponse {
        timestamp_ms: now_epoch_ms(),
        horses,
        ingest,
        age_ms,
    }
}
