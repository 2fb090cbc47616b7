use serde_json::Value;

use super::dedup::dedup_by_identity;
use super::parse::{first_string, parse_string_safe, parse_u32_safe};
use super::payload::{first_value, locate_array};
use crate::types::{ScheduleMatch, Venue};

pub const UNKNOWN_VENUE: &str = "Unknown Venue";

pub fn normalize_venue(v: &Value) -> Venue {
    let match_ids = first_value(v, &["matchIds", "matches"])
        .and_then(|m| m.as_array())
        .map(|ids| {
            ids.iter()
                .map(|id| parse_string_safe(id.get("matchId").or(Some(id))))
                .filter(|id| !id.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Venue {
        venue_id: first_string(v, &["id", "venueId", "groundId"]).unwrap_or_default(),
        venue_name: first_string(v, &["ground", "venueName", "name"])
            .unwrap_or_else(|| UNKNOWN_VENUE.to_string()),
        city: first_string(v, &["city"]).unwrap_or_default(),
        country: first_string(v, &["country"]).unwrap_or_default(),
        capacity: parse_u32_safe(first_value(v, &["capacity"])),
        match_ids,
    }
}

/// Venue list of the venues endpoint, deduplicated.
pub fn normalize_venues(payload: &Value) -> Vec<Venue> {
    let Some(shape) = locate_array(payload, &["seriesVenue", "venues", "venue"], "venues") else {
        return Vec::new();
    };
    dedup_by_identity(shape.records().map(normalize_venue))
}

/// Venue observed on a schedule entry.
pub fn venue_from_match(m: &ScheduleMatch) -> Venue {
    Venue {
        venue_id: m.venue_id.clone(),
        venue_name: if m.venue_name.is_empty() { UNKNOWN_VENUE.to_string() } else { m.venue_name.clone() },
        city: m.venue_city.clone(),
        country: String::new(),
        capacity: 0,
        match_ids: vec![m.match_id.clone()],
    }
}

/// Provider venues first, then venues only seen on the schedule; match ids are
/// attached from the schedule to whichever record holds the identity.
pub fn combine_with_schedule(provider: Vec<Venue>, schedule: &[ScheduleMatch]) -> Vec<Venue> {
    let observed = schedule
        .iter()
        .filter(|m| !m.venue_id.is_empty() || !m.venue_name.is_empty())
        .map(venue_from_match);
    dedup_by_identity(provider.into_iter().chain(observed))
}
