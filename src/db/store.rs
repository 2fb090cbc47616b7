use sqlx::SqlitePool;

use super::models::{SeriesListingRow, SeriesRow};
use crate::error::Result;
use crate::types::Series;

const SELECT_SERIES: &str = r#"
    SELECT series_id, name, short_name, description, series_type, format,
           start_date, end_date, status, venue_country,
           teams, venues, schedule, squads, points_table, points_table_groups, stats,
           total_matches, completed_matches, is_active, priority, created_at, updated_at,
           synced_at
    FROM series
    WHERE series_id = ?
"#;

/// Series documents in SQLite, one row per `series_id`.
#[derive(Clone)]
pub struct SeriesStore {
    pool: SqlitePool,
}

impl SeriesStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn load(&self, series_id: &str) -> Result<Option<Series>> {
        let row: Option<SeriesRow> = sqlx::query_as(SELECT_SERIES)
            .bind(series_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(SeriesRow::into_series).transpose()
    }

    /// Insert-if-absent, otherwise overwrite every column except `created_at`.
    pub async fn save(&self, series: &Series) -> Result<()> {
        let r = SeriesRow::from_series(series)?;
        sqlx::query(
            r#"
            INSERT INTO series (
                series_id, name, short_name, description, series_type, format,
                start_date, end_date, status, venue_country,
                teams, venues, schedule, squads, points_table, points_table_groups, stats,
                total_matches, completed_matches, is_active, priority, created_at, updated_at,
                synced_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(series_id) DO UPDATE SET
                name = excluded.name,
                short_name = excluded.short_name,
                description = excluded.description,
                series_type = excluded.series_type,
                format = excluded.format,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                status = excluded.status,
                venue_country = excluded.venue_country,
                teams = excluded.teams,
                venues = excluded.venues,
                schedule = excluded.schedule,
                squads = excluded.squads,
                points_table = excluded.points_table,
                points_table_groups = excluded.points_table_groups,
                stats = excluded.stats,
                total_matches = excluded.total_matches,
                completed_matches = excluded.completed_matches,
                is_active = excluded.is_active,
                priority = excluded.priority,
                updated_at = excluded.updated_at,
                synced_at = excluded.synced_at
            "#,
        )
        .bind(&r.series_id)
        .bind(&r.name)
        .bind(&r.short_name)
        .bind(&r.description)
        .bind(&r.series_type)
        .bind(&r.format)
        .bind(r.start_date)
        .bind(r.end_date)
        .bind(&r.status)
        .bind(&r.venue_country)
        .bind(&r.teams)
        .bind(&r.venues)
        .bind(&r.schedule)
        .bind(&r.squads)
        .bind(&r.points_table)
        .bind(&r.points_table_groups)
        .bind(&r.stats)
        .bind(r.total_matches)
        .bind(r.completed_matches)
        .bind(r.is_active)
        .bind(r.priority)
        .bind(r.created_at)
        .bind(r.updated_at)
        .bind(&r.synced_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Active series first, then by priority and start date.
    pub async fn list(&self) -> Result<Vec<SeriesListingRow>> {
        let rows = sqlx::query_as(
            r#"
            SELECT series_id, name, short_name, series_type, format, status,
                   start_date, end_date, total_matches, completed_matches,
                   is_active, priority, updated_at
            FROM series
            ORDER BY is_active DESC, priority DESC, start_date IS NULL, start_date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");
    pool
}
