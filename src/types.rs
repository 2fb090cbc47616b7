use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ---------------------------------------------------------------------------
// Sub-resources
// ---------------------------------------------------------------------------

/// Independently synced slices of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubResource {
    Schedule,
    Squads,
    Venues,
    PointsTable,
    Stats,
}

impl SubResource {
    pub const ALL: [SubResource; 5] = [
        SubResource::Schedule,
        SubResource::Squads,
        SubResource::Venues,
        SubResource::PointsTable,
        SubResource::Stats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubResource::Schedule => "schedule",
            SubResource::Squads => "squads",
            SubResource::Venues => "venues",
            SubResource::PointsTable => "points_table",
            SubResource::Stats => "stats",
        }
    }
}

impl std::fmt::Display for SubResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubResource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "schedule" => Ok(SubResource::Schedule),
            "squads" => Ok(SubResource::Squads),
            "venues" => Ok(SubResource::Venues),
            "points_table" | "pointstable" => Ok(SubResource::PointsTable),
            "stats" => Ok(SubResource::Stats),
            _ => Err(AppError::UnknownSubResource(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

/// Lifecycle of a single scheduled match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Upcoming,
    Live,
    Completed,
    Abandoned,
    Cancelled,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MatchStatus::Upcoming => "UPCOMING",
            MatchStatus::Live => "LIVE",
            MatchStatus::Completed => "COMPLETED",
            MatchStatus::Abandoned => "ABANDONED",
            MatchStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle of a whole series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeriesStatus {
    Upcoming,
    Ongoing,
    Completed,
    Postponed,
    Cancelled,
}

impl std::fmt::Display for SeriesStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SeriesStatus::Upcoming => "UPCOMING",
            SeriesStatus::Ongoing => "ONGOING",
            SeriesStatus::Completed => "COMPLETED",
            SeriesStatus::Postponed => "POSTPONED",
            SeriesStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

impl SeriesStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "ONGOING" => SeriesStatus::Ongoing,
            "COMPLETED" => SeriesStatus::Completed,
            "POSTPONED" => SeriesStatus::Postponed,
            "CANCELLED" => SeriesStatus::Cancelled,
            _ => SeriesStatus::Upcoming,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeriesType {
    International,
    Domestic,
    League,
    Women,
}

impl std::fmt::Display for SeriesType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SeriesType::International => "INTERNATIONAL",
            SeriesType::Domestic => "DOMESTIC",
            SeriesType::League => "LEAGUE",
            SeriesType::Women => "WOMEN",
        };
        write!(f, "{s}")
    }
}

impl SeriesType {
    pub fn parse(s: &str) -> Self {
        match s {
            "DOMESTIC" => SeriesType::Domestic,
            "LEAGUE" => SeriesType::League,
            "WOMEN" => SeriesType::Women,
            _ => SeriesType::International,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    T20,
    #[serde(rename = "ODI")]
    Odi,
    #[serde(rename = "TEST")]
    Test,
    #[serde(rename = "MIXED")]
    Mixed,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Format::T20 => "T20",
            Format::Odi => "ODI",
            Format::Test => "TEST",
            Format::Mixed => "MIXED",
        };
        write!(f, "{s}")
    }
}

impl Format {
    pub fn parse(s: &str) -> Self {
        match s {
            "ODI" => Format::Odi,
            "TEST" => Format::Test,
            "MIXED" => Format::Mixed,
            _ => Format::T20,
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: String,
    pub team_name: String,
    pub team_short_name: String,
    pub is_host: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// Empty when the provider omitted it; identity then falls back to `venue_name`.
    pub venue_id: String,
    pub venue_name: String,
    pub city: String,
    pub country: String,
    pub capacity: u32,
    pub match_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,
    pub player_name: String,
    pub role: String,
    pub batting_style: String,
    pub bowling_style: String,
    pub is_playing11: bool,
    pub is_captain: bool,
    pub is_wicket_keeper: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Squad {
    pub squad_id: String,
    pub team_id: String,
    pub team_name: String,
    pub players: Vec<Player>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleMatch {
    pub match_id: String,
    pub match_desc: String,
    pub team1: String,
    pub team2: String,
    pub start_date: Option<DateTime<Utc>>,
    pub venue_id: String,
    pub venue_name: String,
    pub venue_city: String,
    pub status: MatchStatus,
    /// Provider text the status was classified from, kept for diagnostics.
    pub raw_status: String,
    pub format: Format,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsTableRow {
    pub team_id: String,
    pub team_name: String,
    pub team_short_name: String,
    pub group_name: String,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub tied: u32,
    pub no_result: u32,
    pub points: u32,
    pub net_run_rate: f64,
    /// 1-based, unique within `group_name`.
    pub position: u32,
    /// Most recent result last.
    pub form: Vec<String>,
    pub qualify_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsTableGroup {
    pub group_name: String,
    pub rows: Vec<PointsTableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    pub player_id: String,
    pub player_name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLeaderboard {
    pub stat_type: String,
    pub headers: Vec<String>,
    pub entries: Vec<StatEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesVenue {
    pub country: String,
}

pub const DEFAULT_COUNTRY: &str = "TBD";

/// When each sub-resource last merged non-empty data. `None` for series
/// stored before stamps were recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncStamps {
    pub schedule: Option<DateTime<Utc>>,
    pub squads: Option<DateTime<Utc>>,
    pub venues: Option<DateTime<Utc>>,
    pub points_table: Option<DateTime<Utc>>,
    pub stats: Option<DateTime<Utc>>,
}

impl SyncStamps {
    pub fn get(&self, resource: SubResource) -> Option<DateTime<Utc>> {
        match resource {
            SubResource::Schedule => self.schedule,
            SubResource::Squads => self.squads,
            SubResource::Venues => self.venues,
            SubResource::PointsTable => self.points_table,
            SubResource::Stats => self.stats,
        }
    }

    pub fn set(&mut self, resource: SubResource, at: DateTime<Utc>) {
        let slot = match resource {
            SubResource::Schedule => &mut self.schedule,
            SubResource::Squads => &mut self.squads,
            SubResource::Venues => &mut self.venues,
            SubResource::PointsTable => &mut self.points_table,
            SubResource::Stats => &mut self.stats,
        };
        *slot = Some(at);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub series_id: String,
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub series_type: SeriesType,
    pub format: Format,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: SeriesStatus,
    pub venue: SeriesVenue,
    pub teams: Vec<Team>,
    pub venues: Vec<Venue>,
    pub schedule: Vec<ScheduleMatch>,
    pub squads: Vec<Squad>,
    /// Rows of the primary group; every group lives in `points_table_groups`.
    pub points_table: Vec<PointsTableRow>,
    pub points_table_groups: Vec<PointsTableGroup>,
    pub stats: Vec<StatLeaderboard>,
    pub total_matches: u32,
    pub completed_matches: u32,
    pub is_active: bool,
    pub priority: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub synced_at: SyncStamps,
}

impl Series {
    /// A new series with every required field filled from best-effort defaults.
    pub fn with_defaults(series_id: &str, now: DateTime<Utc>) -> Self {
        let name = format!("Series {series_id}");
        Self {
            series_id: series_id.to_string(),
            short_name: short_name_for(&name),
            name,
            description: String::new(),
            series_type: SeriesType::International,
            format: Format::T20,
            start_date: None,
            end_date: None,
            status: SeriesStatus::Upcoming,
            venue: SeriesVenue { country: DEFAULT_COUNTRY.to_string() },
            teams: Vec::new(),
            venues: Vec::new(),
            schedule: Vec::new(),
            squads: Vec::new(),
            points_table: Vec::new(),
            points_table_groups: Vec::new(),
            stats: Vec::new(),
            total_matches: 0,
            completed_matches: 0,
            is_active: true,
            priority: 0,
            created_at: now,
            updated_at: now,
            synced_at: SyncStamps::default(),
        }
    }

    /// Last time `resource` merged data; series-wide `updated_at` when unknown.
    pub fn synced_at(&self, resource: SubResource) -> DateTime<Utc> {
        self.synced_at.get(resource).unwrap_or(self.updated_at)
    }

    /// Number of locally stored items for a sub-resource.
    pub fn sub_resource_len(&self, resource: SubResource) -> usize {
        match resource {
            SubResource::Schedule => self.schedule.len(),
            SubResource::Squads => self.squads.len(),
            SubResource::Venues => self.venues.len(),
            SubResource::PointsTable => self.points_table_groups.len().max(self.points_table.len()),
            SubResource::Stats => self.stats.len(),
        }
    }

    pub fn sub_resource_data(&self, resource: SubResource) -> SubResourceData {
        match resource {
            SubResource::Schedule => SubResourceData::Schedule(self.schedule.clone()),
            SubResource::Squads => SubResourceData::Squads(self.squads.clone()),
            SubResource::Venues => SubResourceData::Venues(self.venues.clone()),
            SubResource::PointsTable => SubResourceData::PointsTable {
                primary: self.points_table.clone(),
                groups: self.points_table_groups.clone(),
            },
            SubResource::Stats => SubResourceData::Stats(self.stats.clone()),
        }
    }
}

pub const MAX_SERIES_ID_LEN: usize = 32;

/// Series ids are substituted into upstream URL paths, so only ASCII
/// letters, digits, `-` and `_` are accepted.
pub fn validate_series_id(series_id: &str) -> Result<&str, AppError> {
    let valid = !series_id.is_empty()
        && series_id.len() <= MAX_SERIES_ID_LEN
        && series_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(series_id)
    } else {
        Err(AppError::InvalidSeriesId(series_id.to_string()))
    }
}

/// Initials of the significant words, e.g. "Asia Cup 2023" → "AC2023".
pub fn short_name_for(name: &str) -> String {
    let short: String = name
        .split_whitespace()
        .map(|word| {
            if word.chars().all(|c| c.is_ascii_digit()) {
                word.to_string()
            } else {
                word.chars()
                    .next()
                    .map(|c| c.to_ascii_uppercase().to_string())
                    .unwrap_or_default()
            }
        })
        .collect();
    if short.is_empty() {
        "UNK".to_string()
    } else {
        short
    }
}

// ---------------------------------------------------------------------------
// Sync reporting
// ---------------------------------------------------------------------------

/// Normalized payload of one sub-resource, as handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "resource", content = "data", rename_all = "snake_case")]
pub enum SubResourceData {
    Schedule(Vec<ScheduleMatch>),
    Squads(Vec<Squad>),
    Venues(Vec<Venue>),
    PointsTable {
        primary: Vec<PointsTableRow>,
        groups: Vec<PointsTableGroup>,
    },
    Stats(Vec<StatLeaderboard>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubResourceFailure {
    pub resource: SubResource,
    pub kind: String,
    pub message: String,
}

/// Per-run summary of what was actually updated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub series_id: String,
    pub has_schedule: bool,
    pub has_squads: bool,
    pub has_venues: bool,
    pub has_points_table: bool,
    pub has_stats: bool,
    pub skipped_fresh: Vec<SubResource>,
    pub failures: Vec<SubResourceFailure>,
}

impl SyncSummary {
    pub fn new(series_id: &str) -> Self {
        Self { series_id: series_id.to_string(), ..Self::default() }
    }

    pub fn mark_updated(&mut self, resource: SubResource) {
        match resource {
            SubResource::Schedule => self.has_schedule = true,
            SubResource::Squads => self.has_squads = true,
            SubResource::Venues => self.has_venues = true,
            SubResource::PointsTable => self.has_points_table = true,
            SubResource::Stats => self.has_stats = true,
        }
    }

    pub fn updated(&self, resource: SubResource) -> bool {
        match resource {
            SubResource::Schedule => self.has_schedule,
            SubResource::Squads => self.has_squads,
            SubResource::Venues => self.has_venues,
            SubResource::PointsTable => self.has_points_table,
            SubResource::Stats => self.has_stats,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub series: Series,
    pub summary: SyncSummary,
}

/// Result of a single-sub-resource read through the sync pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct SubResourceReport {
    pub series_id: String,
    pub updated: bool,
    pub from_cache: bool,
    pub failure: Option<SubResourceFailure>,
    pub payload: SubResourceData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_ids_that_fit_a_path_segment() {
        assert_eq!(validate_series_id("3718").unwrap(), "3718");
        assert!(validate_series_id("ipl-2024_a").is_ok());
    }

    #[test]
    fn series_ids_that_could_escape_the_path_are_rejected() {
        for bad in ["", "../../account/keys", "3718/squads", "3718?x=1", "3718#f", "37%2F18", "..", " 3718"] {
            assert!(
                matches!(validate_series_id(bad), Err(AppError::InvalidSeriesId(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(validate_series_id(&"9".repeat(MAX_SERIES_ID_LEN + 1)).is_err());
    }

    #[test]
    fn sub_resource_names_parse_loosely() {
        assert_eq!("points-table".parse::<SubResource>().unwrap(), SubResource::PointsTable);
        assert_eq!("Schedule".parse::<SubResource>().unwrap(), SubResource::Schedule);
        assert!(matches!("fixtures".parse::<SubResource>(), Err(AppError::UnknownSubResource(_))));
    }
}
