use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use tracing::{info, warn};

use super::freshness::is_fresh;
use crate::config::{Config, SQUAD_PLACEHOLDER};
use crate::db::{merge, SeriesStore, SubResourceUpdate};
use crate::error::{AppError, Result, UpstreamError};
use crate::fetcher::{with_query_param, UpstreamClient};
use crate::normalize::{
    build_squad, combine_with_schedule, dedup_by_identity, normalize_players, normalize_points_table,
    normalize_schedule, normalize_squad_list, normalize_stats, normalize_venues,
};
use crate::state::SyncLocks;
use crate::types::{
    validate_series_id, Series, Squad, StatLeaderboard, SubResource, SubResourceFailure,
    SubResourceReport, SyncReport, SyncSummary,
};

type Fetched = std::result::Result<SubResourceUpdate, UpstreamError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Honor,
    Bypass,
}

/// What one locked pass produced before it is shaped for a caller.
struct Pass {
    series: Option<Series>,
    summary: SyncSummary,
    errors: Vec<(SubResource, UpstreamError)>,
}

/// Decides what to fetch, fetches it, and folds the results into the store.
/// All three entry points serialize per series id.
pub struct SyncOrchestrator {
    cfg: Config,
    client: UpstreamClient,
    store: SeriesStore,
    locks: Arc<SyncLocks>,
}

impl SyncOrchestrator {
    pub fn new(cfg: Config, store: SeriesStore, locks: Arc<SyncLocks>) -> Result<Self> {
        let client = UpstreamClient::new(&cfg)?;
        Ok(Self { cfg, client, store, locks })
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    /// Every sub-resource, each gated by its own TTL.
    pub async fn full_sync(&self, series_id: &str) -> Result<SyncReport> {
        let series_id = validate_series_id(series_id)?;
        let _guard = self.locks.acquire(series_id).await;
        let pass = self.run(series_id, &SubResource::ALL, Gate::Honor).await?;
        match pass.series {
            Some(series) => Ok(SyncReport { series, summary: pass.summary }),
            None => Err(AppError::SeriesNotFound(series_id.to_string())),
        }
    }

    /// Serve one sub-resource from the store when fresh, otherwise sync it first.
    pub async fn get_or_sync(&self, series_id: &str, resource: SubResource) -> Result<SubResourceReport> {
        let series_id = validate_series_id(series_id)?;
        let _guard = self.locks.acquire(series_id).await;
        let pass = self.run(series_id, &[resource], Gate::Honor).await?;
        sub_resource_report(series_id, resource, pass)
    }

    /// Re-fetch one sub-resource regardless of freshness. Only for series that
    /// already exist.
    pub async fn force_refresh(&self, series_id: &str, resource: SubResource) -> Result<SubResourceReport> {
        let series_id = validate_series_id(series_id)?;
        let _guard = self.locks.acquire(series_id).await;
        if self.store.load(series_id).await?.is_none() {
            return Err(AppError::SeriesNotFound(series_id.to_string()));
        }
        let pass = self.run(series_id, &[resource], Gate::Bypass).await?;
        sub_resource_report(series_id, resource, pass)
    }

    // -----------------------------------------------------------------------
    // One pass: gate → fetch (concurrent) → merge (sequential) → save once
    // -----------------------------------------------------------------------

    async fn run(&self, series_id: &str, resources: &[SubResource], gate: Gate) -> Result<Pass> {
        let now = Utc::now();
        let existing = self.store.load(series_id).await?;
        let mut summary = SyncSummary::new(series_id);

        let due: Vec<SubResource> = resources
            .iter()
            .copied()
            .filter(|r| {
                let fresh = gate == Gate::Honor
                    && existing
                        .as_ref()
                        .is_some_and(|s| is_fresh(s, *r, self.cfg.ttls.for_resource(*r), now));
                if fresh {
                    info!(series_id, resource = %r, "[SYNC] {r} fresh, serving cached");
                    summary.skipped_fresh.push(*r);
                }
                !fresh
            })
            .collect();

        if due.is_empty() {
            return Ok(Pass { series: existing, summary, errors: Vec::new() });
        }

        let fetched = try_join_all(due.iter().map(|r| self.fetch_checked(series_id, *r)))
            .await
            .inspect_err(|e| warn!(series_id, "[SYNC] run aborted, nothing persisted: {e}"))?;

        let (series, errors) = self.apply(series_id, existing, fetched, now, &mut summary);
        if SubResource::ALL.iter().any(|r| summary.updated(*r)) {
            if let Some(s) = &series {
                self.store.save(s).await?;
            }
        }

        info!(
            series_id,
            schedule = summary.has_schedule,
            squads = summary.has_squads,
            venues = summary.has_venues,
            points_table = summary.has_points_table,
            stats = summary.has_stats,
            failures = errors.len(),
            "[SYNC] pass complete"
        );
        Ok(Pass { series, summary, errors })
    }

    fn apply(
        &self,
        series_id: &str,
        existing: Option<Series>,
        fetched: Vec<(SubResource, Fetched)>,
        now: DateTime<Utc>,
        summary: &mut SyncSummary,
    ) -> (Option<Series>, Vec<(SubResource, UpstreamError)>) {
        let mut current = existing;
        let mut errors = Vec::new();

        for (resource, result) in fetched {
            let update = match result {
                Ok(update) => update,
                Err(e) => {
                    warn!(series_id, resource = %resource, kind = e.kind(), "[SYNC] {resource} failed: {e}");
                    summary.failures.push(SubResourceFailure {
                        resource,
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    });
                    errors.push((resource, e));
                    continue;
                }
            };

            // Venues observed in the schedule fill gaps in the provider's venue list.
            let update = match update {
                SubResourceUpdate::Venues(provider) => {
                    let schedule = current.as_ref().map(|s| s.schedule.as_slice()).unwrap_or_default();
                    SubResourceUpdate::Venues(combine_with_schedule(provider, schedule))
                }
                other => other,
            };

            let stored = current.is_some();
            let outcome = merge(current.take(), series_id, update, now);
            if outcome.updated {
                summary.mark_updated(resource);
            } else {
                info!(series_id, resource = %resource, "[SYNC] {resource} returned nothing usable, keeping stored data");
            }
            if outcome.updated || stored {
                current = Some(outcome.series);
            }
        }
        (current, errors)
    }

    // -----------------------------------------------------------------------
    // Fetch + normalize per sub-resource
    // -----------------------------------------------------------------------

    /// Rate limiting is the only per-resource outcome that fails the run.
    async fn fetch_checked(&self, series_id: &str, resource: SubResource) -> Result<(SubResource, Fetched)> {
        match self.fetch_update(series_id, resource).await {
            Err(e) if e.is_rate_limited() => Err(AppError::RateLimited { resource, source: e }),
            other => Ok((resource, other)),
        }
    }

    async fn fetch_update(&self, series_id: &str, resource: SubResource) -> Fetched {
        let update = match resource {
            SubResource::Schedule => {
                let payload = self.client.fetch(&self.cfg.endpoint(resource)?, series_id).await?;
                SubResourceUpdate::Schedule(normalize_schedule(&payload))
            }
            SubResource::Venues => {
                let payload = self.client.fetch(&self.cfg.endpoint(resource)?, series_id).await?;
                SubResourceUpdate::Venues(normalize_venues(&payload))
            }
            SubResource::PointsTable => {
                let payload = self.client.fetch(&self.cfg.endpoint(resource)?, series_id).await?;
                SubResourceUpdate::PointsTable(normalize_points_table(&payload))
            }
            SubResource::Squads => SubResourceUpdate::Squads(self.fetch_squads(series_id).await?),
            SubResource::Stats => SubResourceUpdate::Stats(self.fetch_stats(series_id).await?),
        };
        Ok(update)
    }

    /// Squad list, then one paced call per squad for its players.
    async fn fetch_squads(&self, series_id: &str) -> std::result::Result<Vec<Squad>, UpstreamError> {
        let list = self.client.fetch(&self.cfg.endpoint(SubResource::Squads)?, series_id).await?;
        let headers = normalize_squad_list(&list);

        let players_template = match self.cfg.squad_players_endpoint() {
            Ok(t) => Some(t),
            Err(e) => {
                warn!(series_id, "[SYNC] squad players not fetched: {e}");
                None
            }
        };

        let mut squads = Vec::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            let players = match &players_template {
                None => Vec::new(),
                Some(template) => {
                    if i > 0 {
                        tokio::time::sleep(self.cfg.squad_pacing).await;
                    }
                    let url = template.render(series_id).replace(SQUAD_PLACEHOLDER, &header.squad_id);
                    match self.client.fetch_url(&url).await {
                        Ok(payload) => normalize_players(&payload),
                        Err(e) if e.is_rate_limited() => return Err(e),
                        Err(e) => {
                            warn!(series_id, squad_id = %header.squad_id, "[SYNC] squad players failed: {e}");
                            Vec::new()
                        }
                    }
                }
            };
            squads.push(build_squad(header, players, Utc::now()));
        }
        Ok(dedup_by_identity(squads))
    }

    /// One call per configured stat type. Partial results are kept; the first
    /// error is returned only when no stat type produced anything.
    async fn fetch_stats(&self, series_id: &str) -> std::result::Result<Vec<StatLeaderboard>, UpstreamError> {
        let base = self.cfg.endpoint(SubResource::Stats)?.render(series_id);
        let mut boards = Vec::new();
        let mut first_err = None;

        for stat_type in &self.cfg.stats_types {
            match self.client.fetch_url(&with_query_param(&base, "statsType", stat_type)).await {
                Ok(payload) => boards.extend(normalize_stats(stat_type, &payload)),
                Err(e) if e.is_rate_limited() => return Err(e),
                Err(e) => {
                    warn!(series_id, stat_type = %stat_type, "[SYNC] stats fetch failed: {e}");
                    first_err.get_or_insert(e);
                }
            }
        }

        match first_err {
            Some(e) if boards.is_empty() => Err(e),
            _ => Ok(boards),
        }
    }
}

fn sub_resource_report(series_id: &str, resource: SubResource, pass: Pass) -> Result<SubResourceReport> {
    let Pass { series, summary, mut errors } = pass;
    let Some(series) = series else {
        return Err(match errors.pop() {
            Some((resource, source)) => AppError::Upstream { resource, source },
            None => AppError::SeriesNotFound(series_id.to_string()),
        });
    };
    let updated = summary.updated(resource);
    Ok(SubResourceReport {
        series_id: series_id.to_string(),
        updated,
        from_cache: !updated,
        failure: summary.failures.into_iter().find(|f| f.resource == resource),
        payload: series.sub_resource_data(resource),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Ttls;
    use crate::db::store::memory_pool;
    use crate::types::{MatchStatus, SeriesStatus, SubResourceData};
    use mockito::{Matcher, ServerGuard};
    use serde_json::{json, Value};
    use std::time::{Duration, Instant};

    fn wired_config(base: &str) -> Config {
        Config {
            api_key: Some("secret".to_string()),
            api_host: Some("provider.example".to_string()),
            schedule_endpoint: Some(format!("{base}/series/v1/{{id}}")),
            squads_endpoint: Some(format!("{base}/series/v1/{{id}}/squads")),
            squad_players_endpoint: Some(format!("{base}/series/v1/{{id}}/squads/{{squad_id}}")),
            venues_endpoint: Some(format!("{base}/series/v1/{{id}}/venues")),
            points_table_endpoint: Some(format!("{base}/stats/v1/series/{{id}}/points-table")),
            stats_endpoint: Some(format!("{base}/stats/v1/series/{{id}}")),
            stats_types: vec!["mostRuns".to_string()],
            upstream_timeout: Duration::from_secs(2),
            squad_pacing: Duration::from_millis(0),
            ..Config::empty()
        }
    }

    async fn orchestrator(cfg: Config) -> SyncOrchestrator {
        let store = SeriesStore::new(memory_pool().await);
        SyncOrchestrator::new(cfg, store, SyncLocks::new()).unwrap()
    }

    async fn json_mock(server: &mut ServerGuard, path: &str, body: Value) -> mockito::Mock {
        server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    fn asia_cup_schedule() -> Value {
        json!({"matchDetails": [
            {"matchDetailsMap": {"key": "Wed, 30 Aug 2023", "match": [
                {"matchInfo": {
                    "matchId": 75410, "seriesName": "Asia Cup 2023", "matchDesc": "1st Match",
                    "matchFormat": "ODI", "startDate": "1693383000000",
                    "state": "Complete", "status": "Pakistan won by 238 runs",
                    "team1": {"teamId": 3, "teamName": "Pakistan", "teamSName": "PAK"},
                    "team2": {"teamId": 96, "teamName": "Nepal", "teamSName": "NEP"},
                    "venueInfo": {"id": 81, "ground": "Multan Cricket Stadium", "city": "Multan"}
                }},
                {"matchInfo": {
                    "matchId": 75420, "matchDesc": "Super Four 1", "matchFormat": "ODI",
                    "startDate": "1694071800000", "state": "Preview", "status": "Match starts at 09:00 GMT",
                    "team1": {"teamId": 3, "teamName": "Pakistan", "teamSName": "PAK"},
                    "team2": {"teamId": 5, "teamName": "Bangladesh", "teamSName": "BAN"},
                    "venueInfo": {"id": 50, "ground": "Gaddafi Stadium", "city": "Lahore"}
                }}
            ]}}
        ]})
    }

    fn asia_cup_points_table() -> Value {
        json!({"pointsTable": [
            {"groupName": "Group A", "pointsTableInfo": [
                {"teamId": 3, "teamName": "PAK", "teamFullName": "Pakistan", "matchesPlayed": 2,
                 "matchesWon": 1, "noRes": 1, "points": 3, "nrr": "+4.760"},
                {"teamId": 2, "teamName": "IND", "teamFullName": "India", "matchesPlayed": 2,
                 "matchesWon": 1, "noRes": 1, "points": 3, "nrr": "+1.028"}
            ]},
            {"groupName": "Super Fours", "pointsTableInfo": [
                {"teamId": 2, "teamName": "IND", "teamFullName": "India", "matchesPlayed": 3,
                 "matchesWon": 2, "matchesLost": 1, "points": 4, "nrr": "+1.753"},
                {"teamId": 9, "teamName": "SL", "teamFullName": "Sri Lanka", "matchesPlayed": 3,
                 "matchesWon": 2, "matchesLost": 1, "points": 4, "nrr": "-0.134"},
                {"teamId": 3, "teamName": "PAK", "teamFullName": "Pakistan", "matchesPlayed": 3,
                 "matchesWon": 1, "matchesLost": 2, "points": 2, "nrr": "-1.283"},
                {"teamId": 5, "teamName": "BAN", "teamFullName": "Bangladesh", "matchesPlayed": 3,
                 "matchesWon": 1, "matchesLost": 2, "points": 2, "nrr": "-0.463"}
            ]}
        ]})
    }

    #[tokio::test]
    async fn super_fours_become_primary_points_table() {
        let mut server = mockito::Server::new_async().await;
        let _table = json_mock(&mut server, "/stats/v1/series/3718/points-table", asia_cup_points_table()).await;
        let orch = orchestrator(wired_config(&server.url())).await;

        let report = orch.get_or_sync("3718", SubResource::PointsTable).await.unwrap();
        assert!(report.updated);
        assert!(!report.from_cache);
        let SubResourceData::PointsTable { primary, groups } = report.payload else {
            panic!("wrong payload kind");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(primary.len(), 4);
        assert!(primary.iter().all(|r| r.group_name == "Super Fours"));
        let positions: Vec<u32> = primary.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);

        let stored = orch.store().load("3718").await.unwrap().unwrap();
        assert_eq!(stored.points_table, primary);
        assert_eq!(stored.short_name, "S3718");
        assert_eq!(stored.venue.country, "TBD");
    }

    #[tokio::test]
    async fn one_failing_sub_resource_does_not_block_others() {
        let mut server = mockito::Server::new_async().await;
        let _schedule = json_mock(&mut server, "/series/v1/3718", asia_cup_schedule()).await;
        let _table = server
            .mock("GET", "/stats/v1/series/3718/points-table")
            .with_status(500)
            .create_async()
            .await;
        let cfg = Config {
            squads_endpoint: None,
            venues_endpoint: None,
            stats_endpoint: None,
            ..wired_config(&server.url())
        };
        let orch = orchestrator(cfg).await;

        let report = orch.full_sync("3718").await.unwrap();
        let summary = &report.summary;
        assert!(summary.has_schedule);
        assert!(!summary.has_points_table);
        let table_failure = summary
            .failures
            .iter()
            .find(|f| f.resource == SubResource::PointsTable)
            .unwrap();
        assert_eq!(table_failure.kind, "http_status");
        assert!(summary.failures.iter().any(|f| f.kind == "config_missing"));

        let stored = orch.store().load("3718").await.unwrap().unwrap();
        assert_eq!(stored.schedule.len(), 2);
        assert_eq!(stored.name, "Asia Cup 2023");
        assert_eq!(stored.total_matches, 2);
        assert_eq!(stored.completed_matches, 1);
        assert_eq!(stored.status, SeriesStatus::Ongoing);
        assert!(stored.points_table.is_empty());
    }

    #[tokio::test]
    async fn rate_limit_aborts_and_persists_nothing() {
        let mut server = mockito::Server::new_async().await;
        let _schedule = json_mock(&mut server, "/series/v1/3718", asia_cup_schedule()).await;
        let _table = server
            .mock("GET", "/stats/v1/series/3718/points-table")
            .with_status(429)
            .create_async()
            .await;
        let cfg = Config {
            squads_endpoint: None,
            venues_endpoint: None,
            stats_endpoint: None,
            ..wired_config(&server.url())
        };
        let orch = orchestrator(cfg).await;

        let err = orch.full_sync("3718").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimited { resource: SubResource::PointsTable, .. }));
        assert!(orch.store().load("3718").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fresh_data_is_served_without_calling_upstream() {
        let mut server = mockito::Server::new_async().await;
        let schedule = server
            .mock("GET", "/series/v1/3718")
            .with_status(200)
            .with_body(asia_cup_schedule().to_string())
            .expect(1)
            .create_async()
            .await;
        let orch = orchestrator(wired_config(&server.url())).await;

        let first = orch.get_or_sync("3718", SubResource::Schedule).await.unwrap();
        assert!(first.updated);
        let second = orch.get_or_sync("3718", SubResource::Schedule).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.payload, first.payload);
        schedule.assert_async().await;
    }

    #[tokio::test]
    async fn concurrent_requests_coalesce_into_one_fetch() {
        let mut server = mockito::Server::new_async().await;
        let schedule = server
            .mock("GET", "/series/v1/3718")
            .with_status(200)
            .with_body(asia_cup_schedule().to_string())
            .expect(1)
            .create_async()
            .await;
        let orch = Arc::new(orchestrator(wired_config(&server.url())).await);

        let calls = (0..4).map(|_| {
            let orch = Arc::clone(&orch);
            tokio::spawn(async move { orch.get_or_sync("3718", SubResource::Schedule).await })
        });
        for handle in futures_util::future::join_all(calls).await {
            assert!(handle.unwrap().is_ok());
        }
        schedule.assert_async().await;
    }

    #[tokio::test]
    async fn force_refresh_bypasses_freshness() {
        let mut server = mockito::Server::new_async().await;
        let schedule = server
            .mock("GET", "/series/v1/3718")
            .with_status(200)
            .with_body(asia_cup_schedule().to_string())
            .expect(2)
            .create_async()
            .await;
        let orch = orchestrator(wired_config(&server.url())).await;

        orch.get_or_sync("3718", SubResource::Schedule).await.unwrap();
        let refreshed = orch.force_refresh("3718", SubResource::Schedule).await.unwrap();
        assert!(refreshed.updated);
        schedule.assert_async().await;
    }

    #[tokio::test]
    async fn force_refresh_of_unknown_series_is_not_found() {
        let server = mockito::Server::new_async().await;
        let orch = orchestrator(wired_config(&server.url())).await;
        let err = orch.force_refresh("9999", SubResource::Schedule).await.unwrap_err();
        assert!(matches!(err, AppError::SeriesNotFound(id) if id == "9999"));
    }

    #[tokio::test]
    async fn empty_refetch_keeps_stored_schedule() {
        let mut server = mockito::Server::new_async().await;
        let full = json_mock(&mut server, "/series/v1/3718", asia_cup_schedule()).await;
        let orch = orchestrator(wired_config(&server.url())).await;
        orch.get_or_sync("3718", SubResource::Schedule).await.unwrap();
        full.remove_async().await;

        let _empty = json_mock(&mut server, "/series/v1/3718", json!({"matchDetails": []})).await;
        let report = orch.force_refresh("3718", SubResource::Schedule).await.unwrap();
        assert!(!report.updated);
        assert!(report.failure.is_none());
        let stored = orch.store().load("3718").await.unwrap().unwrap();
        assert_eq!(stored.schedule.len(), 2);
        assert_eq!(stored.schedule[0].status, MatchStatus::Completed);
    }

    #[tokio::test]
    async fn squads_are_paced_and_tolerate_player_failures() {
        let mut server = mockito::Server::new_async().await;
        let _list = json_mock(
            &mut server,
            "/series/v1/3718/squads",
            json!({"squads": [
                {"squadType": "squad", "isHeader": true},
                {"squadId": 101, "squadType": "India Squad", "teamId": 2},
                {"squadId": 102, "squadType": "Pakistan Squad", "teamId": 3},
                {"squadId": 103, "squadType": "Nepal Squad", "teamId": 96}
            ]}),
        )
        .await;
        let _india = json_mock(
            &mut server,
            "/series/v1/3718/squads/101",
            json!({"player": [
                {"name": "BATTERS", "isHeader": true},
                {"id": 576, "name": "Rohit Sharma", "role": "Batsman", "captain": true},
                {"id": 1413, "name": "Virat Kohli", "role": "Batsman"}
            ]}),
        )
        .await;
        let _pakistan = server
            .mock("GET", "/series/v1/3718/squads/102")
            .with_status(500)
            .create_async()
            .await;
        let _nepal = json_mock(
            &mut server,
            "/series/v1/3718/squads/103",
            json!({"player": [{"id": 13000, "name": "Rohit Paudel", "captain": true}]}),
        )
        .await;

        let cfg = Config { squad_pacing: Duration::from_millis(60), ..wired_config(&server.url()) };
        let orch = orchestrator(cfg).await;

        let started = Instant::now();
        let report = orch.get_or_sync("3718", SubResource::Squads).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(120));

        let SubResourceData::Squads(squads) = report.payload else {
            panic!("wrong payload kind");
        };
        assert_eq!(squads.len(), 3);
        assert_eq!(squads[0].players.len(), 2);
        assert!(squads[0].players[0].is_captain);
        assert!(squads[1].players.is_empty());
        assert_eq!(squads[2].players[0].player_name, "Rohit Paudel");
    }

    #[tokio::test]
    async fn stats_use_stat_type_query() {
        let mut server = mockito::Server::new_async().await;
        let _runs = server
            .mock("GET", "/stats/v1/series/3718")
            .match_query(Matcher::UrlEncoded("statsType".into(), "mostRuns".into()))
            .with_status(200)
            .with_body(
                json!({"t20StatsList": {"headers": ["Batter", "R"], "values": [
                    {"values": ["1413", "Virat Kohli", "302"]}
                ]}})
                .to_string(),
            )
            .create_async()
            .await;
        let orch = orchestrator(wired_config(&server.url())).await;

        let report = orch.get_or_sync("3718", SubResource::Stats).await.unwrap();
        let SubResourceData::Stats(boards) = report.payload else {
            panic!("wrong payload kind");
        };
        assert_eq!(boards[0].stat_type, "mostRuns");
        assert_eq!(boards[0].entries[0].player_name, "Virat Kohli");
    }

    #[tokio::test]
    async fn venues_include_schedule_grounds() {
        let mut server = mockito::Server::new_async().await;
        let _schedule = json_mock(&mut server, "/series/v1/3718", asia_cup_schedule()).await;
        let _venues = json_mock(
            &mut server,
            "/series/v1/3718/venues",
            json!({"seriesVenue": [{"id": 81, "ground": "Multan Cricket Stadium", "city": "Multan", "country": "Pakistan"}]}),
        )
        .await;
        let cfg = Config {
            squads_endpoint: None,
            points_table_endpoint: None,
            stats_endpoint: None,
            ..wired_config(&server.url())
        };
        let orch = orchestrator(cfg).await;

        let report = orch.full_sync("3718").await.unwrap();
        let venues = &report.series.venues;
        assert_eq!(venues.len(), 2);
        assert_eq!(venues[0].country, "Pakistan");
        assert_eq!(report.series.venue.country, "Pakistan");
    }

    #[tokio::test]
    async fn nothing_configured_means_not_found() {
        let orch = orchestrator(Config::empty()).await;

        let err = orch.full_sync("3718").await.unwrap_err();
        assert!(matches!(err, AppError::SeriesNotFound(_)));

        let err = orch.get_or_sync("3718", SubResource::Schedule).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Upstream { source: UpstreamError::ConfigMissing(_), .. }
        ));
    }

    fn schedule_only(base: &str) -> Config {
        Config {
            squads_endpoint: None,
            venues_endpoint: None,
            points_table_endpoint: None,
            stats_endpoint: None,
            ..wired_config(base)
        }
    }

    #[tokio::test]
    async fn path_escaping_series_id_is_rejected_before_any_call() {
        let mut server = mockito::Server::new_async().await;
        let escaped = server
            .mock("GET", "/account/keys")
            .with_status(200)
            .with_body("{}")
            .expect(0)
            .create_async()
            .await;
        let orch = orchestrator(wired_config(&server.url())).await;

        for result in [
            orch.get_or_sync("../../account/keys", SubResource::Schedule).await.map(|_| ()),
            orch.force_refresh("../../account/keys", SubResource::Schedule).await.map(|_| ()),
            orch.full_sync("../../account/keys").await.map(|_| ()),
        ] {
            assert!(matches!(result, Err(AppError::InvalidSeriesId(_))));
        }
        escaped.assert_async().await;
        assert!(orch.store().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rate_limited_squad_players_abort_the_run() {
        let mut server = mockito::Server::new_async().await;
        let _schedule = json_mock(&mut server, "/series/v1/3718", asia_cup_schedule()).await;
        let _list = json_mock(
            &mut server,
            "/series/v1/3718/squads",
            json!({"squads": [
                {"squadId": 101, "squadType": "India Squad", "teamId": 2},
                {"squadId": 102, "squadType": "Pakistan Squad", "teamId": 3}
            ]}),
        )
        .await;
        let _india = server
            .mock("GET", "/series/v1/3718/squads/101")
            .with_status(429)
            .create_async()
            .await;
        let pakistan = server
            .mock("GET", "/series/v1/3718/squads/102")
            .with_status(200)
            .with_body("{}")
            .expect(0)
            .create_async()
            .await;
        let cfg = Config {
            squads_endpoint: Some(format!("{}/series/v1/{{id}}/squads", server.url())),
            squad_players_endpoint: Some(format!("{}/series/v1/{{id}}/squads/{{squad_id}}", server.url())),
            ..schedule_only(&server.url())
        };
        let orch = orchestrator(cfg).await;

        let err = orch.full_sync("3718").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimited { resource: SubResource::Squads, .. }));
        assert!(orch.store().load("3718").await.unwrap().is_none());
        pakistan.assert_async().await;
    }

    #[tokio::test]
    async fn rate_limited_stats_abort_the_run() {
        let mut server = mockito::Server::new_async().await;
        let _schedule = json_mock(&mut server, "/series/v1/3718", asia_cup_schedule()).await;
        let _stats = server
            .mock("GET", "/stats/v1/series/3718")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;
        let cfg = Config {
            stats_endpoint: Some(format!("{}/stats/v1/series/{{id}}", server.url())),
            ..schedule_only(&server.url())
        };
        let orch = orchestrator(cfg).await;

        let err = orch.full_sync("3718").await.unwrap_err();
        assert!(matches!(err, AppError::RateLimited { resource: SubResource::Stats, .. }));
        assert!(orch.store().load("3718").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stored_points_table_survives_failed_refetch() {
        let mut server = mockito::Server::new_async().await;
        let table = json_mock(&mut server, "/stats/v1/series/3718/points-table", asia_cup_points_table()).await;
        let cfg = Config {
            points_table_endpoint: Some(format!("{}/stats/v1/series/{{id}}/points-table", server.url())),
            ttls: Ttls { points_table: Duration::ZERO, ..Ttls::default() },
            ..schedule_only(&server.url())
        };
        let orch = orchestrator(cfg).await;

        orch.get_or_sync("3718", SubResource::PointsTable).await.unwrap();
        let seeded = orch.store().load("3718").await.unwrap().unwrap();
        assert_eq!(seeded.points_table.len(), 4);
        assert!(seeded.schedule.is_empty());

        table.remove_async().await;
        let _broken = server
            .mock("GET", "/stats/v1/series/3718/points-table")
            .with_status(500)
            .create_async()
            .await;
        let _schedule = json_mock(&mut server, "/series/v1/3718", asia_cup_schedule()).await;

        let report = orch.full_sync("3718").await.unwrap();
        assert!(report.summary.has_schedule);
        assert!(!report.summary.has_points_table);
        assert!(report
            .summary
            .failures
            .iter()
            .any(|f| f.resource == SubResource::PointsTable && f.kind == "http_status"));

        let stored = orch.store().load("3718").await.unwrap().unwrap();
        assert_eq!(stored.schedule.len(), 2);
        assert_eq!(stored.points_table, seeded.points_table);
        assert_eq!(stored.points_table_groups, seeded.points_table_groups);
    }

    #[tokio::test]
    async fn unreachable_and_malformed_are_recorded_per_resource() {
        let mut server = mockito::Server::new_async().await;
        let _schedule = json_mock(&mut server, "/series/v1/3718", asia_cup_schedule()).await;
        let _venues = server
            .mock("GET", "/series/v1/3718/venues")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;
        let cfg = Config {
            venues_endpoint: Some(format!("{}/series/v1/{{id}}/venues", server.url())),
            points_table_endpoint: Some("http://127.0.0.1:1/points-table/{id}".to_string()),
            ..schedule_only(&server.url())
        };
        let orch = orchestrator(cfg).await;

        let report = orch.full_sync("3718").await.unwrap();
        let kind_of = |resource: SubResource| {
            report
                .summary
                .failures
                .iter()
                .find(|f| f.resource == resource)
                .map(|f| f.kind.as_str())
        };
        assert_eq!(kind_of(SubResource::Venues), Some("malformed"));
        assert_eq!(kind_of(SubResource::PointsTable), Some("unreachable"));
        assert!(report.summary.has_schedule);
        assert_eq!(report.series.schedule.len(), 2);
    }
}
