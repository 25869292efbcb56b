//! reqwest implementation of [`ComfortApi`]

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::{ClientError, ComfortApi, OPTIMIZE_ENDPOINT, PROBE_ENDPOINT};
use crate::config::BackendConfig;
use crate::types::{ComfortConfig, OptimizeEnvelope, PowerReading, SensorReading};

pub const PROBE_PATH: &str = "/api/hvac-power";
pub const OPTIMIZE_PATH: &str = "/agent/optimize";

/// HTTP client for the comfort backend.
///
/// The base URL is fixed at construction; no retries, and no timeout unless
/// one is configured.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        Ok(Self { http, base_url })
    }

    /// Get base URL for logging
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into a `Status` error.
    ///
    /// The body is read best-effort: a failed read leaves the detail empty
    /// instead of replacing the status error.
    async fn status_error(endpoint: &'static str, resp: reqwest::Response) -> ClientError {
        let status = resp.status().as_u16();
        let detail = resp.text().await.unwrap_or_default().trim().to_string();
        warn!(endpoint, status, detail = %detail, "Backend returned error status");
        ClientError::Status {
            endpoint,
            status,
            detail,
        }
    }
}

#[async_trait]
impl ComfortApi for ApiClient {
    async fn probe(&self, reading: &SensorReading) -> Result<PowerReading, ClientError> {
        let url = self.endpoint_url(PROBE_PATH);
        debug!(
            url = %url,
            indoor = reading.indoor,
            occupancy = reading.occupancy,
            outdoor = reading.outdoor,
            "Probing comfort oracle"
        );

        let resp = self
            .http
            .get(url)
            .query(&reading.query_pairs())
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Self::status_error(PROBE_ENDPOINT, resp).await);
        }

        let body = resp.bytes().await?;
        let power: PowerReading =
            serde_json::from_slice(&body).map_err(|source| ClientError::Decode {
                endpoint: PROBE_ENDPOINT,
                source,
            })?;

        debug!(
            hvac_power = power.hvac_power,
            naive_hvac_power = power.naive_hvac_power,
            "Oracle responded"
        );
        Ok(power)
    }

    async fn optimize(&self, config: &ComfortConfig) -> Result<Value, ClientError> {
        let url = self.endpoint_url(OPTIMIZE_PATH);
        debug!(
            url = %url,
            lat = config.lat,
            lon = config.lon,
            comfort_low = config.comfort_low,
            comfort_high = config.comfort_high,
            "Submitting optimization job"
        );

        let resp = self.http.post(url).json(config).send().await?;

        if !resp.status().is_success() {
            return Err(Self::status_error(OPTIMIZE_ENDPOINT, resp).await);
        }

        let text = resp.text().await?;
        let body = match serde_json::from_str::<Value>(&text) {
            Ok(body) => body,
            Err(e) => {
                // Surfaced as raw text by the normalizer.
                debug!(error = %e, "Optimize body is not JSON, passing through as text");
                Value::String(text)
            }
        };

        OptimizeEnvelope::classify(body)
            .into_plan()
            .map_err(|error| {
                warn!(error = %error, "Optimizer rejected the job");
                ClientError::Rejected(error)
            })
    }
}
