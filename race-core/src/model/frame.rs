// Render-ready per-tick description handed to the presentation layer.

use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameRow {
    pub rank: usize,
    pub horse_id: i32,
    pub gap_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_kph: Option<f64>,
    pub computed_meters_to_finish: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeaderInfo {
    pub horse_id: i32,
    pub meters_to_finish: i64,
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_kph: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RaceFrame {
    pub rows: Vec<FrameRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<LeaderInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_line_x: Option<f64>,
    pub scale: f64,
    pub max_meters_to_finish: f64,
    pub min_meters_to_finish: f64,
}

impl RaceFrame {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            leader: None,
            finish_line_x: None,
            scale: 1.0,
            max_meters_to_finish: 0.0,
            min_meters_to_finish: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
