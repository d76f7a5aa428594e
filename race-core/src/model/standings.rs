// Per-horse telemetry records decoded from a single CLASSIFICA datagram.
// Invariants: order is the transmitted finishing order (index 0 = leader); never re-sorted.

use serde::Serialize;

pub const LAST_ONE_MARKER: &str = "last one";

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "meters", rename_all = "snake_case")]
pub enum Gap {
    Meters(f64),
    LastOne,
    // Present but not a number; counts as zero like LastOne.
    Unparsed,
}

impl Gap {
    pub fn meters(&self) -> Option<f64> {
        match self {
            Gap::Meters(value) => Some(*value),
            Gap::LastOne | Gap::Unparsed => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HorseTelemetry {
    pub horse_id: i32,
    pub gap: Gap,
    pub gap_text: String,
    pub meters_to_finish: f64,
    pub lateral_position: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_kph: Option<f64>,
}

impl HorseTelemetry {
    pub fn gap_meters(&self) -> Option<f64> {
        self.gap.meters()
    }

    pub fn gap_label(&self) -> String {
        match self.gap {
            Gap::Meters(value) => format!("+{} m", value.trunc() as i64),
            Gap::LastOne | Gap::Unparsed => self.gap_text.clone(),
        }
    }
}

pub type Standings = Vec<HorseTelemetry>;
