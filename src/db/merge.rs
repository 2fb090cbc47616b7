use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::normalize::status::{infer_series_type, series_format, series_status};
use crate::normalize::{dedup_by_identity, Identity, PointsTable, ScheduleBundle};
use crate::types::{
    short_name_for, MatchStatus, Series, SeriesStatus, Squad, StatLeaderboard, SubResource, Venue,
    DEFAULT_COUNTRY,
};

/// Normalized data for exactly one sub-resource.
#[derive(Debug, Clone, PartialEq)]
pub enum SubResourceUpdate {
    Schedule(ScheduleBundle),
    Squads(Vec<Squad>),
    Venues(Vec<Venue>),
    PointsTable(PointsTable),
    Stats(Vec<StatLeaderboard>),
}

impl SubResourceUpdate {
    pub fn resource(&self) -> SubResource {
        match self {
            SubResourceUpdate::Schedule(_) => SubResource::Schedule,
            SubResourceUpdate::Squads(_) => SubResource::Squads,
            SubResourceUpdate::Venues(_) => SubResource::Venues,
            SubResourceUpdate::PointsTable(_) => SubResource::PointsTable,
            SubResourceUpdate::Stats(_) => SubResource::Stats,
        }
    }

    /// Empty results mean "nothing new", never "clear what is stored".
    pub fn is_empty(&self) -> bool {
        match self {
            SubResourceUpdate::Schedule(b) => b.matches.is_empty(),
            SubResourceUpdate::Squads(s) => s.is_empty(),
            SubResourceUpdate::Venues(v) => v.is_empty(),
            SubResourceUpdate::PointsTable(t) => t.groups.is_empty(),
            SubResourceUpdate::Stats(s) => s.is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub series: Series,
    pub updated: bool,
}

/// Fold one sub-resource into the stored series (or a fresh one).
/// Only the touched sub-resource and the fields derived from it change.
pub fn merge(
    existing: Option<Series>,
    series_id: &str,
    update: SubResourceUpdate,
    now: DateTime<Utc>,
) -> MergeOutcome {
    let mut series = existing.unwrap_or_else(|| Series::with_defaults(series_id, now));
    let resource = update.resource();
    if update.is_empty() {
        return MergeOutcome { series, updated: false };
    }

    match update {
        SubResourceUpdate::Schedule(bundle) => apply_schedule(&mut series, bundle),
        SubResourceUpdate::Squads(squads) => {
            series.squads = merge_squads(std::mem::take(&mut series.squads), squads);
        }
        SubResourceUpdate::Venues(venues) => {
            series.venues = venues;
            if series.venue.country.is_empty() || series.venue.country == DEFAULT_COUNTRY {
                if let Some(country) = dominant_country(&series.venues) {
                    series.venue.country = country;
                }
            }
        }
        SubResourceUpdate::PointsTable(table) => {
            series.points_table_groups = table.groups;
            series.points_table = table.primary;
        }
        SubResourceUpdate::Stats(stats) => series.stats = stats,
    }

    series.updated_at = now;
    series.synced_at.set(resource, now);
    fill_required_defaults(&mut series);
    MergeOutcome { series, updated: true }
}

fn apply_schedule(series: &mut Series, bundle: ScheduleBundle) {
    let ScheduleBundle { matches, teams, venues, series_name } = bundle;

    if let Some(name) = series_name {
        if series.name.is_empty() || series.name == format!("Series {}", series.series_id) {
            series.short_name = short_name_for(&name);
            series.series_type = infer_series_type(&name);
            series.name = name;
        }
    }

    if !teams.is_empty() {
        let previous = std::mem::take(&mut series.teams);
        series.teams = dedup_by_identity(teams.into_iter().chain(previous));
    }
    // Stored venues pick up match ids and new grounds from the schedule. An
    // empty venue list is left for the venues sync to fill.
    if !series.venues.is_empty() {
        let stored = std::mem::take(&mut series.venues);
        series.venues = dedup_by_identity(stored.into_iter().chain(venues));
    }

    series.total_matches = matches.len() as u32;
    series.completed_matches = matches
        .iter()
        .filter(|m| m.status == MatchStatus::Completed)
        .count() as u32;
    series.status = series_status(&matches);
    series.is_active = !matches!(series.status, SeriesStatus::Completed | SeriesStatus::Cancelled);
    if let Some(format) = series_format(&matches) {
        series.format = format;
    }
    let dates = matches.iter().filter_map(|m| m.start_date);
    if let Some(first) = dates.clone().min() {
        series.start_date = Some(first);
    }
    if let Some(last) = dates.max() {
        series.end_date = Some(last);
    }
    series.schedule = matches;
}

/// Incoming squads replace stored ones team by team. A squad that came back
/// without players keeps the players already stored for that team, and stored
/// squads absent from this pass are retained.
pub fn merge_squads(existing: Vec<Squad>, incoming: Vec<Squad>) -> Vec<Squad> {
    let mut stored: HashMap<String, Squad> = existing
        .iter()
        .map(|s| (s.identity_key(), s.clone()))
        .collect();

    let merged = incoming.into_iter().map(|mut squad| {
        if squad.players.is_empty() {
            if let Some(prev) = stored.remove(&squad.identity_key()) {
                squad.players = prev.players;
                squad.last_updated = prev.last_updated;
            }
        }
        squad
    });
    let merged: Vec<Squad> = merged.collect();
    dedup_by_identity(merged.into_iter().chain(existing))
}

/// Most frequent non-empty venue country, first seen on ties.
fn dominant_country(venues: &[Venue]) -> Option<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for v in venues.iter().filter(|v| !v.country.is_empty()) {
        match counts.iter_mut().find(|(c, _)| *c == v.country) {
            Some((_, n)) => *n += 1,
            None => counts.push((v.country.clone(), 1)),
        }
    }
    let max = counts.iter().map(|(_, n)| *n).max()?;
    counts.into_iter().find(|(_, n)| *n == max).map(|(c, _)| c)
}

fn fill_required_defaults(series: &mut Series) {
    if series.name.is_empty() {
        series.name = format!("Series {}", series.series_id);
    }
    if series.short_name.is_empty() {
        series.short_name = short_name_for(&series.name);
    }
    if series.venue.country.is_empty() {
        series.venue.country = DEFAULT_COUNTRY.to_string();
    }
}
