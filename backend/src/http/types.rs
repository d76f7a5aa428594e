// HTTP response payload types.

use std::sync::Arc;

use race_core::{Standings, TrackLayout};
use serde::Serialize;

use crate::store::IngestStats;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct StandingsResponse {
    pub timestamp_ms: u64,
    pub horses: Arc<Standings>,
    pub ingest: IngestStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_ms: Option<u64>,
}

#[derive(Serialize)]
pub struct OverlayConfigResponse {
    pub fps: u32,
    pub alpha: f64,
    pub idle_reset_ms: u64,
    pub layout: TrackLayout,
}
