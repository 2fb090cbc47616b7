use std::time::Duration;

use crate::error::{AppError, Result, UpstreamError};
use crate::types::SubResource;

/// Token replaced by the series id in endpoint templates.
pub const DEFAULT_PLACEHOLDER: &str = "{id}";

/// Token replaced by the squad id in the squad-players template.
pub const SQUAD_PLACEHOLDER: &str = "{squad_id}";

/// Upstream request timeout (seconds).
pub const UPSTREAM_TIMEOUT_SECS: u64 = 15;

/// Pause between consecutive per-squad player fetches (milliseconds).
/// Keeps a full squads sync under the provider's burst limit.
pub const SQUAD_PACING_MS: u64 = 1000;

/// Default freshness TTLs (seconds).
pub mod ttl_defaults {
    pub const SCHEDULE: u64 = 60 * 60;
    pub const POINTS_TABLE: u64 = 2 * 60 * 60;
    pub const SQUADS: u64 = 24 * 60 * 60;
    pub const VENUES: u64 = 24 * 60 * 60;
    pub const STATS: u64 = 6 * 60 * 60;
}

/// Stat leaderboards fetched by the stats sub-resource when STATS_TYPES is unset.
pub const DEFAULT_STATS_TYPES: &[&str] = &["mostRuns", "mostWickets"];

/// An upstream URL with an embedded placeholder for the entity id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate {
    pub raw: String,
    pub placeholder: String,
}

impl EndpointTemplate {
    pub fn new(raw: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self { raw: raw.into(), placeholder: placeholder.into() }
    }

    /// Substitute `id` into every occurrence of the placeholder.
    pub fn render(&self, id: &str) -> String {
        if self.placeholder.is_empty() {
            return self.raw.clone();
        }
        self.raw.replace(&self.placeholder, id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ttls {
    pub schedule: Duration,
    pub squads: Duration,
    pub venues: Duration,
    pub points_table: Duration,
    pub stats: Duration,
}

impl Ttls {
    pub fn for_resource(&self, resource: SubResource) -> Duration {
        match resource {
            SubResource::Schedule => self.schedule,
            SubResource::Squads => self.squads,
            SubResource::Venues => self.venues,
            SubResource::PointsTable => self.points_table,
            SubResource::Stats => self.stats,
        }
    }
}

impl Default for Ttls {
    fn default() -> Self {
        Self {
            schedule: Duration::from_secs(ttl_defaults::SCHEDULE),
            squads: Duration::from_secs(ttl_defaults::SQUADS),
            venues: Duration::from_secs(ttl_defaults::VENUES),
            points_table: Duration::from_secs(ttl_defaults::POINTS_TABLE),
            stats: Duration::from_secs(ttl_defaults::STATS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub db_path: String,
    pub api_port: u16,
    /// Provider key sent as `x-rapidapi-key` (UPSTREAM_API_KEY)
    pub api_key: Option<String>,
    /// Provider host sent as `x-rapidapi-host` (UPSTREAM_API_HOST)
    pub api_host: Option<String>,
    /// Placeholder embedded in the templates below (UPSTREAM_PLACEHOLDER).
    /// Templates copied from provider docs often carry a sample numeric id here.
    pub placeholder: String,
    pub schedule_endpoint: Option<String>,
    pub squads_endpoint: Option<String>,
    /// Must contain both the series placeholder and `{squad_id}`.
    pub squad_players_endpoint: Option<String>,
    pub venues_endpoint: Option<String>,
    pub points_table_endpoint: Option<String>,
    /// `statsType` is appended as a query parameter per entry of `stats_types`.
    pub stats_endpoint: Option<String>,
    pub stats_types: Vec<String>,
    pub upstream_timeout: Duration,
    pub squad_pacing: Duration,
    pub ttls: Ttls,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let ttls = Ttls {
            schedule: env_secs("TTL_SCHEDULE_SECS", ttl_defaults::SCHEDULE),
            squads: env_secs("TTL_SQUADS_SECS", ttl_defaults::SQUADS),
            venues: env_secs("TTL_VENUES_SECS", ttl_defaults::VENUES),
            points_table: env_secs("TTL_POINTS_TABLE_SECS", ttl_defaults::POINTS_TABLE),
            stats: env_secs("TTL_STATS_SECS", ttl_defaults::STATS),
        };

        let stats_types: Vec<String> = std::env::var("STATS_TYPES")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "series.db".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            api_key: env_opt("UPSTREAM_API_KEY"),
            api_host: env_opt("UPSTREAM_API_HOST"),
            placeholder: env_opt("UPSTREAM_PLACEHOLDER")
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
            schedule_endpoint: env_opt("SCHEDULE_ENDPOINT"),
            squads_endpoint: env_opt("SQUADS_ENDPOINT"),
            squad_players_endpoint: env_opt("SQUAD_PLAYERS_ENDPOINT"),
            venues_endpoint: env_opt("VENUES_ENDPOINT"),
            points_table_endpoint: env_opt("POINTS_TABLE_ENDPOINT"),
            stats_endpoint: env_opt("STATS_ENDPOINT"),
            stats_types: if stats_types.is_empty() {
                DEFAULT_STATS_TYPES.iter().map(|s| s.to_string()).collect()
            } else {
                stats_types
            },
            upstream_timeout: env_secs("UPSTREAM_TIMEOUT_SECS", UPSTREAM_TIMEOUT_SECS),
            squad_pacing: Duration::from_millis(
                std::env::var("SQUAD_PACING_MS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(SQUAD_PACING_MS),
            ),
            ttls,
        })
    }

    /// Defaults with no credentials or endpoints configured.
    pub fn empty() -> Self {
        Self {
            log_level: "info".to_string(),
            db_path: "series.db".to_string(),
            api_port: 3000,
            api_key: None,
            api_host: None,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            schedule_endpoint: None,
            squads_endpoint: None,
            squad_players_endpoint: None,
            venues_endpoint: None,
            points_table_endpoint: None,
            stats_endpoint: None,
            stats_types: DEFAULT_STATS_TYPES.iter().map(|s| s.to_string()).collect(),
            upstream_timeout: Duration::from_secs(UPSTREAM_TIMEOUT_SECS),
            squad_pacing: Duration::from_millis(SQUAD_PACING_MS),
            ttls: Ttls::default(),
        }
    }

    /// Provider credentials as a `(key, host)` pair.
    pub fn credentials(&self) -> std::result::Result<(&str, &str), UpstreamError> {
        match (self.api_key.as_deref(), self.api_host.as_deref()) {
            (Some(key), Some(host)) => Ok((key, host)),
            (None, _) => Err(UpstreamError::ConfigMissing("UPSTREAM_API_KEY is not set".to_string())),
            (_, None) => Err(UpstreamError::ConfigMissing("UPSTREAM_API_HOST is not set".to_string())),
        }
    }

    /// Validated endpoint template for a sub-resource.
    /// Missing values only affect that sub-resource.
    pub fn endpoint(&self, resource: SubResource) -> std::result::Result<EndpointTemplate, UpstreamError> {
        let (value, var) = match resource {
            SubResource::Schedule => (&self.schedule_endpoint, "SCHEDULE_ENDPOINT"),
            SubResource::Squads => (&self.squads_endpoint, "SQUADS_ENDPOINT"),
            SubResource::Venues => (&self.venues_endpoint, "VENUES_ENDPOINT"),
            SubResource::PointsTable => (&self.points_table_endpoint, "POINTS_TABLE_ENDPOINT"),
            SubResource::Stats => (&self.stats_endpoint, "STATS_ENDPOINT"),
        };
        self.credentials()?;
        match value {
            Some(raw) => Ok(EndpointTemplate::new(raw.clone(), self.placeholder.clone())),
            None => Err(UpstreamError::ConfigMissing(format!("{var} is not set"))),
        }
    }

    pub fn squad_players_endpoint(&self) -> std::result::Result<EndpointTemplate, UpstreamError> {
        self.credentials()?;
        match &self.squad_players_endpoint {
            Some(raw) => Ok(EndpointTemplate::new(raw.clone(), self.placeholder.clone())),
            None => Err(UpstreamError::ConfigMissing("SQUAD_PLAYERS_ENDPOINT is not set".to_string())),
        }
    }

    /// Sub-resources whose configuration is incomplete, checked once at startup.
    pub fn missing_endpoints(&self) -> Vec<(SubResource, UpstreamError)> {
        let mut missing: Vec<(SubResource, UpstreamError)> = SubResource::ALL
            .iter()
            .filter_map(|r| self.endpoint(*r).err().map(|e| (*r, e)))
            .collect();
        if !missing.iter().any(|(r, _)| *r == SubResource::Squads) {
            if let Err(e) = self.squad_players_endpoint() {
                missing.push((SubResource::Squads, e));
            }
        }
        missing
    }
}

fn env_opt(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_secs(var: &str, default: u64) -> Duration {
    Duration::from_secs(
        std::env::var(var)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(default),
    )
}
