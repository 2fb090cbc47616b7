use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::types::SubResource;

/// Failure classes of a single upstream call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("upstream configuration missing: {0}")]
    ConfigMissing(String),

    #[error("upstream rate limit hit on {url}")]
    RateLimited { url: String },

    #[error("upstream unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("upstream returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("upstream body for {url} is not valid JSON: {reason}")]
    Malformed { url: String, reason: String },
}

impl UpstreamError {
    /// Short machine-readable tag used in sync summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::ConfigMissing(_) => "config_missing",
            UpstreamError::RateLimited { .. } => "rate_limited",
            UpstreamError::Unreachable { .. } => "unreachable",
            UpstreamError::Status { .. } => "http_status",
            UpstreamError::Malformed { .. } => "malformed",
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, UpstreamError::RateLimited { .. })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream rate limit reached while syncing {resource}: {source}")]
    RateLimited {
        resource: SubResource,
        source: UpstreamError,
    },

    #[error("Upstream error while syncing {resource}: {source}")]
    Upstream {
        resource: SubResource,
        source: UpstreamError,
    },

    #[error("Series {0} not found")]
    SeriesNotFound(String),

    #[error("Unknown sub-resource: {0}")]
    UnknownSubResource(String),

    #[error("Invalid series id: {0:?}")]
    InvalidSeriesId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::SeriesNotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnknownSubResource(_) | AppError::InvalidSeriesId(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream {
                source: UpstreamError::ConfigMissing(_),
                ..
            } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
