// Race reconstruction: absolute distances from chained gaps, then track-space targets.
// Invariants: the last standings entry is the anchor; scale is never derived from a zero span.
// Each step towards the leader subtracts the gap carried by the horse ahead; missing gaps count as zero.

use serde::Serialize;

use crate::model::Standings;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrackLayout {
    pub track_start_x: f64,
    pub track_end_x: f64,
    pub track_top_y: f64,
    pub track_bottom_y: f64,
    pub margin_distance_m: f64,
    pub lateral_min_m: f64,
    pub lateral_max_m: f64,
}

impl Default for TrackLayout {
    fn default() -> Self {
        Self {
            track_start_x: 1200.0,
            track_end_x: 4600.0,
            track_top_y: 800.0,
            track_bottom_y: 1600.0,
            margin_distance_m: 50.0,
            lateral_min_m: 0.0,
            lateral_max_m: 20.0,
        }
    }
}

impl TrackLayout {
    pub fn track_width(&self) -> f64 {
        self.track_end_x - self.track_start_x
    }

    pub fn lateral_to_screen_y(&self, lateral_position: f64) -> f64 {
        let band = self.track_bottom_y - self.track_top_y;
        let domain = self.lateral_max_m - self.lateral_min_m;
        let y = if domain == 0.0 {
            self.track_top_y + band / 2.0
        } else {
            self.track_bottom_y - ((lateral_position - self.lateral_min_m) / domain) * band
        };
        y.clamp(self.track_top_y, self.track_bottom_y)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReconstructedHorse {
    pub horse_id: i32,
    pub computed_meters_to_finish: f64,
    pub target_x: f64,
    pub target_y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RaceState {
    pub horses: Vec<ReconstructedHorse>,
    pub max_meters_to_finish: f64,
    pub min_meters_to_finish: f64,
    pub scale: f64,
    margin_distance_m: f64,
    track_start_x: f64,
}

impl RaceState {
    pub fn is_empty(&self) -> bool {
        self.horses.is_empty()
    }

    pub fn get(&self, horse_id: i32) -> Option<&ReconstructedHorse> {
        self.horses.iter().find(|horse| horse.horse_id == horse_id)
    }

    // Screen x where computed_meters_to_finish == 0.
    pub fn finish_line_x(&self) -> f64 {
        self.track_start_x + self.scale * (self.max_meters_to_finish + self.margin_distance_m)
    }
}

fn empty_state(layout: &TrackLayout) -> RaceState {
    RaceState {
        horses: Vec::new(),
        max_meters_to_finish: 0.0,
        min_meters_to_finish: 0.0,
        scale: 1.0,
        margin_distance_m: layout.margin_distance_m,
        track_start_x: layout.track_start_x,
    }
}

pub fn reconstruct(standings: &Standings, layout: &TrackLayout) -> RaceState {
    let Some(last) = standings.last() else {
        return empty_state(layout);
    };

    let computed = computed_meters_to_finish(standings, last.meters_to_finish);
    let max = computed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = computed.iter().copied().fold(f64::INFINITY, f64::min);

    // Finite gaps can still overflow once chained.
    let total_span = (max - min) + 2.0 * layout.margin_distance_m;
    if !total_span.is_finite() {
        return empty_state(layout);
    }
    let scale = if total_span == 0.0 {
        1.0
    } else {
        layout.track_width() / total_span
    };
    if !scale.is_finite() {
        return empty_state(layout);
    }

    let horses = standings
        .iter()
        .zip(computed)
        .map(|(horse, meters)| ReconstructedHorse {
            horse_id: horse.horse_id,
            computed_meters_to_finish: meters,
            target_x: layout.track_start_x + scale * (max - meters + layout.margin_distance_m),
            target_y: layout.lateral_to_screen_y(horse.lateral_position),
        })
        .collect();

    RaceState {
        horses,
        max_meters_to_finish: max,
        min_meters_to_finish: min,
        scale,
        margin_distance_m: layout.margin_distance_m,
        track_start_x: layout.track_start_x,
    }
}

fn computed_meters_to_finish(standings: &Standings, anchor: f64) -> Vec<f64> {
    let mut computed = vec![0.0; standings.len()];
    let mut cumulative = anchor;
    let last = standings.len() - 1;
    computed[last] = cumulative;
    for index in (0..last).rev() {
        cumulative -= standings[index].gap_meters().unwrap_or(0.0);
        computed[index] = cumulative;
    }
    computed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gap, HorseTelemetry};

    fn horse(horse_id: i32, gap: Gap, meters_to_finish: f64, lateral_position: f64) -> HorseTelemetry {
        HorseTelemetry {
            horse_id,
            gap,
            gap_text: String::new(),
            meters_to_finish,
            lateral_position,
            speed_kph: None,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn empty_standings_use_unit_scale() {
        let state = reconstruct(&Vec::new(), &TrackLayout::default());
        assert!(state.is_empty());
        assert_eq!(state.scale, 1.0);
        assert_eq!(state.max_meters_to_finish, 0.0);
        assert_eq!(state.min_meters_to_finish, 0.0);
    }

    #[test]
    fn trailer_anchors_the_chain() {
        let standings = vec![
            horse(1, Gap::Meters(15.0), 1200.0, 10.0),
            horse(2, Gap::LastOne, 1215.0, 8.0),
        ];
        let state = reconstruct(&standings, &TrackLayout::default());
        assert_close(state.get(2).expect("horse 2").computed_meters_to_finish, 1215.0);
        assert_close(state.get(1).expect("horse 1").computed_meters_to_finish, 1200.0);
    }

    #[test]
    fn each_step_uses_the_gap_carried_by_the_horse_ahead() {
        // The leader's "last one" counts as zero; the trailer's own gap is never read.
        let standings = vec![
            horse(1, Gap::LastOne, 1200.0, 10.0),
            horse(2, Gap::Meters(15.0), 1215.0, 8.0),
        ];
        let state = reconstruct(&standings, &TrackLayout::default());
        assert_close(state.get(2).expect("horse 2").computed_meters_to_finish, 1215.0);
        assert_close(state.get(1).expect("horse 1").computed_meters_to_finish, 1215.0);
        assert_close(state.scale, TrackLayout::default().track_width() / 100.0);
    }

    #[test]
    fn overflowing_gap_chain_falls_back_to_unit_scale() {
        let standings = vec![
            horse(1, Gap::Meters(1e308), 100.0, 10.0),
            horse(2, Gap::Meters(1e308), 100.0, 10.0),
            horse(3, Gap::LastOne, 100.0, 10.0),
        ];
        let state = reconstruct(&standings, &TrackLayout::default());
        assert!(state.is_empty());
        assert_eq!(state.scale, 1.0);
        assert!(state.finish_line_x().is_finite());
    }

    #[test]
    fn each_horse_is_its_gap_ahead_of_the_next() {
        let standings = vec![
            horse(4, Gap::Meters(2.5), 990.0, 3.0),
            horse(8, Gap::Unparsed, 993.0, 6.0),
            horse(1, Gap::Meters(4.0), 995.0, 9.0),
            horse(6, Gap::Meters(1.25), 999.0, 12.0),
            horse(3, Gap::LastOne, 1001.0, 15.0),
        ];
        let state = reconstruct(&standings, &TrackLayout::default());
        assert_close(state.horses[4].computed_meters_to_finish, 1001.0);
        for index in 0..standings.len() - 1 {
            let gap = standings[index].gap_meters().unwrap_or(0.0);
            assert_close(
                state.horses[index].computed_meters_to_finish,
                state.horses[index + 1].computed_meters_to_finish - gap,
            );
        }
    }

    #[test]
    fn scale_spans_field_plus_margins() {
        let layout = TrackLayout::default();
        let standings = vec![
            horse(1, Gap::Meters(30.0), 0.0, 10.0),
            horse(2, Gap::Meters(70.0), 0.0, 10.0),
            horse(3, Gap::LastOne, 500.0, 10.0),
        ];
        let state = reconstruct(&standings, &layout);
        assert_close(state.max_meters_to_finish, 500.0);
        assert_close(state.min_meters_to_finish, 400.0);
        assert_close(state.scale, layout.track_width() / 200.0);

        let leader = state.get(1).expect("leader");
        let trailer = state.get(3).expect("trailer");
        assert_close(trailer.target_x, layout.track_start_x + state.scale * 50.0);
        assert_close(leader.target_x, layout.track_end_x - state.scale * 50.0);
        assert!(leader.target_x > trailer.target_x);
    }

    #[test]
    fn single_horse_spans_twice_the_margin() {
        let layout = TrackLayout::default();
        let state = reconstruct(&vec![horse(5, Gap::LastOne, 321.0, 10.0)], &layout);
        assert_close(state.scale, layout.track_width() / (2.0 * layout.margin_distance_m));
        assert_close(state.horses[0].target_x, layout.track_start_x + layout.track_width() / 2.0);
    }

    #[test]
    fn zero_span_without_margin_uses_unit_scale() {
        let layout = TrackLayout {
            margin_distance_m: 0.0,
            ..TrackLayout::default()
        };
        let standings = vec![
            horse(1, Gap::Meters(0.0), 100.0, 10.0),
            horse(2, Gap::LastOne, 100.0, 10.0),
        ];
        let state = reconstruct(&standings, &layout);
        assert_eq!(state.scale, 1.0);
        assert_close(state.horses[0].target_x, layout.track_start_x);
    }

    #[test]
    fn lateral_position_maps_inverted_and_clamped() {
        let layout = TrackLayout::default();
        assert_close(layout.lateral_to_screen_y(0.0), layout.track_bottom_y);
        assert_close(layout.lateral_to_screen_y(20.0), layout.track_top_y);
        assert_close(layout.lateral_to_screen_y(10.0), 1200.0);
        assert_close(layout.lateral_to_screen_y(-5.0), layout.track_bottom_y);
        assert_close(layout.lateral_to_screen_y(42.0), layout.track_top_y);
    }

    #[test]
    fn degenerate_lateral_domain_centres_the_horse() {
        let layout = TrackLayout {
            lateral_min_m: 5.0,
            lateral_max_m: 5.0,
            ..TrackLayout::default()
        };
        assert_close(layout.lateral_to_screen_y(5.0), 1200.0);
    }

    #[test]
    fn finish_line_sits_where_remaining_distance_is_zero() {
        let layout = TrackLayout::default();
        let standings = vec![
            horse(1, Gap::Meters(20.0), 80.0, 10.0),
            horse(2, Gap::LastOne, 100.0, 10.0),
        ];
        let state = reconstruct(&standings, &layout);
        let expected = layout.track_start_x + state.scale * (100.0 + 50.0);
        assert_close(state.finish_line_x(), expected);
        assert!(state.finish_line_x() > state.get(1).expect("leader").target_x);
    }
}
