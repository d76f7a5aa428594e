// Core data models for standings snapshots and render-ready frames.

mod frame;
mod standings;

pub use frame::{FrameRow, LeaderInfo, RaceFrame};
pub use standings::{Gap, HorseTelemetry, Standings, LAST_ONE_MARKER};
