use tracing::debug;

use crate::types::{Format, MatchStatus, ScheduleMatch, SeriesStatus, SeriesType};

// Keyword classes, evaluated strictly in this order. A match paused for tea
// also "has a result" pending, so LIVE must win before COMPLETED is consulted.
const LIVE_KEYWORDS: &[&str] = &[
    "live",
    "in progress",
    "innings break",
    "rain delay",
    "tea break",
    "lunch break",
    "drinks break",
];
const COMPLETED_KEYWORDS: &[&str] = &[
    "complete",
    "finished",
    "won by",
    "match tied",
    "no result",
    "result",
];
const ABANDONED_KEYWORDS: &[&str] = &["abandon", "washed out"];
const CANCELLED_KEYWORDS: &[&str] = &["cancel", "postponed"];
const UPCOMING_KEYWORDS: &[&str] = &[
    "upcoming",
    "preview",
    "scheduled",
    "starts",
    "yet to begin",
    "gmt",
    "ist",
];

/// Map free-text provider status to a match lifecycle state.
pub fn classify(raw: &str) -> MatchStatus {
    let text = raw.to_lowercase();
    let has = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    if has(LIVE_KEYWORDS) {
        MatchStatus::Live
    } else if has(COMPLETED_KEYWORDS) {
        MatchStatus::Completed
    } else if has(ABANDONED_KEYWORDS) {
        MatchStatus::Abandoned
    } else if has(CANCELLED_KEYWORDS) {
        MatchStatus::Cancelled
    } else {
        if !text.is_empty() && !has(UPCOMING_KEYWORDS) && !contains_clock_time(&text) {
            debug!(raw = %raw, "[NORMALIZE] unrecognized status text, defaulting to UPCOMING");
        }
        MatchStatus::Upcoming
    }
}

/// True if the text contains an `H:MM` / `HH:MM` time of day.
fn contains_clock_time(text: &str) -> bool {
    let b = text.as_bytes();
    (1..b.len().saturating_sub(2)).any(|i| {
        b[i] == b':' && b[i - 1].is_ascii_digit() && b[i + 1].is_ascii_digit() && b[i + 2].is_ascii_digit()
    })
}

/// Series lifecycle derived from its classified schedule.
pub fn series_status(matches: &[ScheduleMatch]) -> SeriesStatus {
    if matches.is_empty() {
        return SeriesStatus::Upcoming;
    }
    let called_off = |m: &ScheduleMatch| matches!(m.status, MatchStatus::Abandoned | MatchStatus::Cancelled);

    if matches.iter().all(called_off) {
        let all_postponed = matches
            .iter()
            .all(|m| m.raw_status.to_lowercase().contains("postpone"));
        return if all_postponed { SeriesStatus::Postponed } else { SeriesStatus::Cancelled };
    }
    if matches
        .iter()
        .all(|m| m.status == MatchStatus::Completed || called_off(m))
    {
        return SeriesStatus::Completed;
    }
    if matches
        .iter()
        .any(|m| matches!(m.status, MatchStatus::Live | MatchStatus::Completed | MatchStatus::Abandoned))
    {
        return SeriesStatus::Ongoing;
    }
    SeriesStatus::Upcoming
}

/// Format of a single match from provider text such as `"T20"`, `"T20I"`, `"ODI"`.
pub fn infer_format(raw: &str) -> Format {
    let text = raw.to_lowercase();
    if text.contains("t20") {
        Format::T20
    } else if text.contains("odi") || text.contains("one day") {
        Format::Odi
    } else if text.contains("test") {
        Format::Test
    } else {
        Format::Mixed
    }
}

/// Single format shared by every match, MIXED when they differ, None when empty.
pub fn series_format(matches: &[ScheduleMatch]) -> Option<Format> {
    let first = matches.first()?.format;
    if matches.iter().all(|m| m.format == first) {
        Some(first)
    } else {
        Some(Format::Mixed)
    }
}

const LEAGUE_MARKERS: &[&str] = &["league", "ipl", "bbl", "psl", "cpl", "sa20", "premier"];
const DOMESTIC_MARKERS: &[&str] = &[
    "domestic",
    "ranji",
    "duleep",
    "vijay hazare",
    "mushtaq ali",
    "county",
    "shield",
    "plunket",
];

pub fn infer_series_type(name: &str) -> SeriesType {
    let text = name.to_lowercase();
    if text.contains("women") {
        SeriesType::Women
    } else if LEAGUE_MARKERS.iter().any(|k| text.contains(k)) {
        SeriesType::League
    } else if DOMESTIC_MARKERS.iter().any(|k| text.contains(k)) {
        SeriesType::Domestic
    } else {
        SeriesType::International
    }
}
