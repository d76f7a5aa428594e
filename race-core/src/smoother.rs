// Per-horse exponential smoothing of screen positions across frame ticks.
// Invariants: keyed by horse_id, not rank; first sighting snaps to target.

use std::collections::HashMap;

use serde::Serialize;

pub const DEFAULT_ALPHA: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug)]
pub struct PositionSmoother {
    alpha: f64,
    positions: HashMap<i32, ScreenPoint>,
}

impl Default for PositionSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

impl PositionSmoother {
    // alpha in (0, 1]; validated by configuration.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            positions: HashMap::new(),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn advance(&mut self, horse_id: i32, target_x: f64, target_y: f64) -> ScreenPoint {
        let alpha = self.alpha;
        let point = self
            .positions
            .entry(horse_id)
            .and_modify(|point| {
                point.x += alpha * (target_x - point.x);
                point.y += alpha * (target_y - point.y);
            })
            .or_insert(ScreenPoint {
                x: target_x,
                y: target_y,
            });
        *point
    }

    pub fn position(&self, horse_id: i32) -> Option<ScreenPoint> {
        self.positions.get(&horse_id).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn reset(&mut self) {
        self.positions.clear();
    }
}
