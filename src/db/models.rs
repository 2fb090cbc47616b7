/// Database row types matching `migrations/0001_series.sql`.
/// Collections are stored as JSON text and decoded here.
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::types::{Format, Series, SeriesStatus, SeriesType, SeriesVenue};

#[derive(Debug, sqlx::FromRow)]
pub struct SeriesRow {
    pub series_id: String,
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub series_type: String,
    pub format: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub venue_country: String,
    pub teams: String,
    pub venues: String,
    pub schedule: String,
    pub squads: String,
    pub points_table: String,
    pub points_table_groups: String,
    pub stats: String,
    pub total_matches: i64,
    pub completed_matches: i64,
    pub is_active: bool,
    pub priority: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced_at: String,
}

impl SeriesRow {
    pub fn from_series(s: &Series) -> Result<Self> {
        Ok(Self {
            series_id: s.series_id.clone(),
            name: s.name.clone(),
            short_name: s.short_name.clone(),
            description: s.description.clone(),
            series_type: s.series_type.to_string(),
            format: s.format.to_string(),
            start_date: s.start_date,
            end_date: s.end_date,
            status: s.status.to_string(),
            venue_country: s.venue.country.clone(),
            teams: serde_json::to_string(&s.teams)?,
            venues: serde_json::to_string(&s.venues)?,
            schedule: serde_json::to_string(&s.schedule)?,
            squads: serde_json::to_string(&s.squads)?,
            points_table: serde_json::to_string(&s.points_table)?,
            points_table_groups: serde_json::to_string(&s.points_table_groups)?,
            stats: serde_json::to_string(&s.stats)?,
            total_matches: i64::from(s.total_matches),
            completed_matches: i64::from(s.completed_matches),
            is_active: s.is_active,
            priority: s.priority,
            created_at: s.created_at,
            updated_at: s.updated_at,
            synced_at: serde_json::to_string(&s.synced_at)?,
        })
    }

    pub fn into_series(self) -> Result<Series> {
        Ok(Series {
            series_type: SeriesType::parse(&self.series_type),
            format: Format::parse(&self.format),
            status: SeriesStatus::parse(&self.status),
            venue: SeriesVenue { country: self.venue_country },
            teams: serde_json::from_str(&self.teams)?,
            venues: serde_json::from_str(&self.venues)?,
            schedule: serde_json::from_str(&self.schedule)?,
            squads: serde_json::from_str(&self.squads)?,
            points_table: serde_json::from_str(&self.points_table)?,
            points_table_groups: serde_json::from_str(&self.points_table_groups)?,
            stats: serde_json::from_str(&self.stats)?,
            synced_at: serde_json::from_str(&self.synced_at)?,
            total_matches: u32::try_from(self.total_matches).unwrap_or(0),
            completed_matches: u32::try_from(self.completed_matches).unwrap_or(0),
            series_id: self.series_id,
            name: self.name,
            short_name: self.short_name,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            is_active: self.is_active,
            priority: self.priority,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Scalar-only projection used by the listing endpoint.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SeriesListingRow {
    pub series_id: String,
    pub name: String,
    pub short_name: String,
    pub series_type: String,
    pub format: String,
    pub status: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub total_matches: i64,
    pub completed_matches: i64,
    pub is_active: bool,
    pub priority: i64,
    pub updated_at: DateTime<Utc>,
}
