// Frame producer: fixed-rate reconstruction of the latest standings into race frames.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use race_core::{compose_frame, reconstruct, PositionSmoother, RaceFrame, Standings, TrackLayout};
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::Config;
use crate::constants::SCHEMA_VERSION;
use crate::store::{IngestStats, StandingsStore};
use crate::utils::{monotonic_ms, next_sequence, now_epoch_ms};
use crate::ws::FrameMessage;

pub struct FrameProducer {
    layout: TrackLayout,
    smoother: PositionSmoother,
    // 0 disables idle detection.
    idle_reset_ms: u64,
    idle: bool,
    sent_empty: bool,
}

impl FrameProducer {
    pub fn new(layout: TrackLayout, alpha: f64, idle_reset_ms: u64) -> Self {
        Self {
            layout,
            smoother: PositionSmoother::new(alpha),
            idle_reset_ms,
            idle: true,
            sent_empty: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.layout, config.alpha, config.idle_reset_ms)
    }

    pub fn smoother(&self) -> &PositionSmoother {
        &self.smoother
    }

    pub fn tick(&mut self, standings: &Standings, stats: &IngestStats, now_ms: u64) -> Option<RaceFrame> {
        self.track_idle(stats, now_ms);

        if standings.is_empty() {
            if !self.smoother.is_empty() {
                info!(tracked = self.smoother.len(), "empty standings; smoothing table cleared");
                self.smoother.reset();
            }
            if self.sent_empty {
                return None;
            }
            self.sent_empty = true;
            return Some(RaceFrame::empty());
        }

        self.sent_empty = false;
        let state = reconstruct(standings, &self.layout);
        Some(compose_frame(standings, &state, &mut self.smoother, &self.layout))
    }

    // A feed that resumes after going quiet starts a new race; reused ids must snap.
    fn track_idle(&mut self, stats: &IngestStats, now_ms: u64) {
        let fresh = match (stats.last_publish_ms, self.idle_reset_ms) {
            (None, _) => false,
            (Some(_), 0) => true,
            (Some(last), idle_ms) => now_ms.saturating_sub(last) < idle_ms,
        };

        if fresh && self.idle {
            if !self.smoother.is_empty() {
                info!(tracked = self.smoother.len(), "race feed resumed; smoothing table cleared");
                self.smoother.reset();
            }
        } else if !fresh && !self.idle {
            info!(idle_after_ms = self.idle_reset_ms, "race feed idle");
        }
        self.idle = !fresh;
    }
}

pub async fn frame_task(
    store: Arc<StandingsStore>,
    tx: broadcast::Sender<String>,
    sequence: Arc<AtomicU64>,
    start: Instant,
    config: Arc<Config>,
) {
    let mut producer = FrameProducer::from_config(&config);
    let mut interval = time::interval(config.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(fps = config.fps, alpha = config.alpha, "frame producer started");

    loop {
        interval.tick().await;
        let (standings, stats) = store.read_with_stats().await;
        let now_ms = monotonic_ms(start);

        let Some(frame) = producer.tick(&standings, &stats, now_ms) else {
            continue;
        };

        let message = FrameMessage {
            schema_version: SCHEMA_VERSION,
            timestamp_ms: now_epoch_ms(),
            monotonic_ms: now_ms,
            sequence: next_sequence(sequence.as_ref()),
            message_type: "race_frame",
            frame,
        };

        match serde_json::to_string(&message) {
            Ok(payload) => {
                let _ = tx.send(payload);
            }
            Err(err) => debug!(?err, "race frame serialization failed"),
        }
    }
}
