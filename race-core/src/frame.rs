// Per-tick frame assembly from standings, reconstruction, and smoothing.
// Invariants: the smoother advances exactly once per listed horse per frame; `state` comes from the same standings.

use crate::model::{FrameRow, LeaderInfo, RaceFrame, Standings};
use crate::reconstruct::{RaceState, TrackLayout};
use crate::smoother::PositionSmoother;

pub const FINISH_LINE_SHOW_WITHIN_M: i64 = 150;
pub const FINISH_LINE_HIDE_AFTER_M: i64 = -300;

pub fn compose_frame(
    standings: &Standings,
    state: &RaceState,
    smoother: &mut PositionSmoother,
    layout: &TrackLayout,
) -> RaceFrame {
    if standings.is_empty() || state.is_empty() {
        return RaceFrame::empty();
    }

    let mut rows = Vec::with_capacity(standings.len());
    for (index, (horse, target)) in standings.iter().zip(&state.horses).enumerate() {
        if horse.horse_id != target.horse_id {
            continue;
        }
        let point = smoother.advance(horse.horse_id, target.target_x, target.target_y);
        rows.push(FrameRow {
            rank: index + 1,
            horse_id: horse.horse_id,
            gap_label: horse.gap_label(),
            speed_kph: horse.speed_kph,
            computed_meters_to_finish: target.computed_meters_to_finish,
            x: point.x,
            y: point.y,
        });
    }

    let leader = rows.first().map(|row| {
        let meters_to_finish = row.computed_meters_to_finish.trunc() as i64;
        LeaderInfo {
            horse_id: row.horse_id,
            meters_to_finish,
            finished: meters_to_finish <= 0,
            speed_kph: row.speed_kph,
        }
    });

    let finish_line_x = leader
        .as_ref()
        .filter(|leader| {
            leader.meters_to_finish <= FINISH_LINE_SHOW_WITHIN_M
                && leader.meters_to_finish > FINISH_LINE_HIDE_AFTER_M
        })
        .map(|_| state.finish_line_x())
        .filter(|x| *x <= layout.track_end_x);

    RaceFrame {
        rows,
        leader,
        finish_line_x,
        scale: state.scale,
        max_meters_to_finish: state.max_meters_to_finish,
        min_meters_to_finish: state.min_meters_to_finish,
    }
}
