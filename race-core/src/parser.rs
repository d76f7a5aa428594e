// CLASSIFICA standings parser.
// Invariants: required fields drop the record, optional fields become None; transmitted order is kept.
// A non-standings payload (no marker, not UTF-8) is None; a standings packet with no valid records is Some(empty).

use crate::model::{Gap, HorseTelemetry, Standings, LAST_ONE_MARKER};

pub const PACKET_MARKER: &str = "CLASSIFICA";
pub const RECORD_FIELDS: usize = 6;

pub fn decode(raw: &[u8]) -> Option<Standings> {
    let text = std::str::from_utf8(raw).ok()?;
    let body = text.strip_prefix(PACKET_MARKER)?;
    let body = body.trim_start_matches(',');

    Some(record_groups(body).filter_map(parse_record).collect())
}

fn record_groups(body: &str) -> impl Iterator<Item = &str> {
    let mut rest = body;
    std::iter::from_fn(move || loop {
        let open = rest.find('(')?;
        let after_open = &rest[open + 1..];
        let close = after_open.find(')')?;
        if close == 0 {
            rest = after_open;
            continue;
        }
        let group = &after_open[..close];
        rest = &after_open[close + 1..];
        return Some(group);
    })
}

fn parse_record(group: &str) -> Option<HorseTelemetry> {
    let parts: Vec<&str> = group.split(',').collect();
    if parts.len() != RECORD_FIELDS {
        return None;
    }
    let [horse_id, gap, meters_to_finish, lateral_position, speed, _time] = parts[..] else {
        return None;
    };

    let horse_id = parse_i32(horse_id)?;
    let gap_text = gap.trim();
    let meters_to_finish = parse_f64(meters_to_finish)?;
    let lateral_position = parse_f64(lateral_position)?;

    Some(HorseTelemetry {
        horse_id,
        gap: parse_gap(gap_text),
        gap_text: gap_text.to_string(),
        meters_to_finish,
        lateral_position,
        speed_kph: parse_f64(speed),
    })
}

fn parse_gap(text: &str) -> Gap {
    if text.eq_ignore_ascii_case(LAST_ONE_MARKER) {
        return Gap::LastOne;
    }
    match parse_f64(text) {
        Some(value) => Gap::Meters(value),
        None => Gap::Unparsed,
    }
}

fn parse_i32(value: &str) -> Option<i32> {
    value.trim().parse::<i32>().ok()
}

fn parse_f64(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
