use serde_json::Value;
use tracing::debug;

use super::dedup::dedup_by_identity;
use super::parse::{first_string, parse_timestamp_safe};
use super::payload::{first_value, locate_array, ArraySource};
use super::status::{classify, infer_format};
use super::team::{normalize_team, UNKNOWN_TEAM};
use super::venue::venue_from_match;
use crate::types::{Format, ScheduleMatch, Team, Venue};

/// Shapes the schedule endpoint has been seen to use.
#[derive(Debug)]
pub enum SchedulePayload<'a> {
    /// `matchDetails[].matchDetailsMap.match[]`, one bucket per match day.
    DayGrouped(Vec<&'a Value>),
    /// A flat list of match entries, under a known key or bare.
    Flat(Vec<&'a Value>, ArraySource),
    Empty,
}

impl<'a> SchedulePayload<'a> {
    pub fn decode(payload: &'a Value) -> Self {
        if let Some(days) = payload.get("matchDetails").and_then(|d| d.as_array()) {
            let entries = days
                .iter()
                .filter_map(|day| day.get("matchDetailsMap"))
                .filter_map(|map| map.get("match").and_then(|m| m.as_array()))
                .flatten()
                .collect();
            return SchedulePayload::DayGrouped(entries);
        }
        match locate_array(payload, &["matches", "schedule", "matchList"], "schedule") {
            Some(shape) => {
                let source = shape.source.clone();
                SchedulePayload::Flat(shape.records().collect(), source)
            }
            None => SchedulePayload::Empty,
        }
    }

    fn entries(self) -> Vec<&'a Value> {
        match self {
            SchedulePayload::DayGrouped(e) | SchedulePayload::Flat(e, _) => e,
            SchedulePayload::Empty => Vec::new(),
        }
    }
}

/// Everything a schedule response yields: matches plus the teams and venues
/// observed across them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleBundle {
    pub matches: Vec<ScheduleMatch>,
    pub teams: Vec<Team>,
    pub venues: Vec<Venue>,
    pub series_name: Option<String>,
}

/// Map one match entry. Entries without a match id are dropped.
pub fn normalize_match(entry: &Value) -> Option<ScheduleMatch> {
    let info = entry.get("matchInfo").unwrap_or(entry);
    let match_id = first_string(info, &["matchId", "id"])?;

    let state = first_string(info, &["state"]).unwrap_or_default();
    let status_text = first_string(info, &["status", "matchStatus"]).unwrap_or_default();
    let raw_status = if status_text.is_empty() { state.clone() } else { status_text.clone() };
    let status = classify(&format!("{state} {status_text}"));

    let format_text = first_string(info, &["matchFormat", "format"]).unwrap_or_default();
    let format = if format_text.is_empty() { Format::T20 } else { infer_format(&format_text) };

    let (venue_id, venue_name, venue_city) = match first_value(info, &["venueInfo", "venue"]) {
        Some(Value::String(name)) => (String::new(), name.trim().to_string(), String::new()),
        Some(venue) => (
            first_string(venue, &["id", "venueId"]).unwrap_or_default(),
            first_string(venue, &["ground", "name", "venueName"]).unwrap_or_default(),
            first_string(venue, &["city"]).unwrap_or_default(),
        ),
        None => (String::new(), String::new(), String::new()),
    };

    Some(ScheduleMatch {
        match_id,
        match_desc: first_string(info, &["matchDesc", "description", "name"]).unwrap_or_default(),
        team1: side_name(info, "team1", &["team1Name", "homeTeam"]),
        team2: side_name(info, "team2", &["team2Name", "awayTeam"]),
        start_date: parse_timestamp_safe(first_value(info, &["startDate", "startDt", "date"])),
        venue_id,
        venue_name,
        venue_city,
        status,
        raw_status,
        format,
    })
}

fn side_name(info: &Value, object_key: &str, flat_keys: &[&str]) -> String {
    match info.get(object_key) {
        Some(team) if team.is_object() => normalize_team(team).team_name,
        _ => first_string(info, flat_keys).unwrap_or_else(|| UNKNOWN_TEAM.to_string()),
    }
}

fn side_teams(entry: &Value) -> Vec<Team> {
    let info = entry.get("matchInfo").unwrap_or(entry);
    ["team1", "team2"]
        .iter()
        .filter_map(|k| info.get(*k).filter(|t| t.is_object()))
        .map(normalize_team)
        .collect()
}

pub fn normalize_schedule(payload: &Value) -> ScheduleBundle {
    let decoded = SchedulePayload::decode(payload);
    if let SchedulePayload::Flat(_, ArraySource::Discovered(ref key)) = decoded {
        debug!(key = %key, "[NORMALIZE] schedule decoded from discovered list");
    }
    let entries = decoded.entries();

    let series_name = entries.iter().find_map(|e| {
        let info = e.get("matchInfo").unwrap_or(e);
        first_string(info, &["seriesName"])
    });

    let matches = dedup_by_identity(entries.iter().filter_map(|e| normalize_match(e)));
    let teams = dedup_by_identity(entries.iter().flat_map(|e| side_teams(e)));
    let venues = dedup_by_identity(
        matches
            .iter()
            .filter(|m| !m.venue_id.is_empty() || !m.venue_name.is_empty())
            .map(venue_from_match),
    );

    ScheduleBundle { matches, teams, venues, series_name }
}
