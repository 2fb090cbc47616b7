use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{Config, EndpointTemplate};
use crate::error::{AppError, Result, UpstreamError};

const KEY_HEADER: &str = "x-rapidapi-key";
const HOST_HEADER: &str = "x-rapidapi-host";

/// Authenticated, timeout-bounded GET client for the upstream provider.
/// Classifies every response; never retries and never caches.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    api_key: Option<String>,
    api_host: Option<String>,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.upstream_timeout)
            .build()
            .map_err(AppError::Http)?;
        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            api_host: cfg.api_host.clone(),
            timeout: cfg.upstream_timeout,
        })
    }

    /// Substitute `id` into the template and GET it.
    pub async fn fetch(
        &self,
        template: &EndpointTemplate,
        id: &str,
    ) -> std::result::Result<Value, UpstreamError> {
        let url = template.render(id);
        self.fetch_url(&url).await
    }

    pub async fn fetch_url(&self, url: &str) -> std::result::Result<Value, UpstreamError> {
        let (Some(key), Some(host)) = (self.api_key.as_deref(), self.api_host.as_deref()) else {
            return Err(UpstreamError::ConfigMissing(
                "UPSTREAM_API_KEY and UPSTREAM_API_HOST must both be set".to_string(),
            ));
        };
        if url.trim().is_empty() {
            return Err(UpstreamError::ConfigMissing("endpoint template rendered empty".to_string()));
        }

        let started = Instant::now();
        let resp = self
            .client
            .get(url)
            .header(KEY_HEADER, key)
            .header(HOST_HEADER, host)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::Unreachable {
                url: url.to_string(),
                reason: describe_transport_error(&e, self.timeout),
            })?;

        let status = resp.status();
        debug!(
            url = %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "[UPSTREAM] GET {url} → {status}"
        );

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(url = %url, "[UPSTREAM] rate limited by provider");
            return Err(UpstreamError::RateLimited { url: url.to_string() });
        }
        if !status.is_success() {
            return Err(UpstreamError::Status { url: url.to_string(), status: status.as_u16() });
        }

        let body = resp.text().await.map_err(|e| UpstreamError::Unreachable {
            url: url.to_string(),
            reason: describe_transport_error(&e, self.timeout),
        })?;

        serde_json::from_str::<Value>(&body).map_err(|e| UpstreamError::Malformed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

fn describe_transport_error(e: &reqwest::Error, timeout: Duration) -> String {
    if e.is_timeout() {
        format!("timed out after {}s", timeout.as_secs())
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}

/// Append `key=value` to a URL that may already carry a query string.
/// Both sides are form-encoded; an unparseable URL is returned unchanged so
/// the request fails downstream as `Unreachable`.
pub fn with_query_param(url: &str, key: &str, value: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.query_pairs_mut().append_pair(key, value);
            parsed.into()
        }
        Err(_) => url.to_string(),
    }
}
