//! Backend client: comfort oracle probe and agent optimization transport
//!
//! `ComfortApi` is the seam between the orchestrator and the network. The
//! production implementation is [`ApiClient`] (reqwest); tests substitute
//! in-memory fakes.

mod http;

pub use http::{ApiClient, OPTIMIZE_PATH, PROBE_PATH};

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{ComfortConfig, PowerReading, SensorReading};

/// Endpoint labels used in error messages and logs.
pub const PROBE_ENDPOINT: &str = "hvac-power";
pub const OPTIMIZE_ENDPOINT: &str = "optimize";

/// Transport-level failures for either endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{endpoint} failed: {status}{}", detail_suffix(.detail))]
    Status {
        endpoint: &'static str,
        status: u16,
        detail: String,
    },
    #[error("{endpoint} returned an undecodable body: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// `{ok: false, error}` from the optimizer; displays the server text verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

fn detail_suffix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!(" {detail}")
    }
}

impl ClientError {
    /// HTTP status for `Status` errors.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Remote comfort services.
#[async_trait]
pub trait ComfortApi: Send + Sync {
    /// One oracle read for the given inputs.
    async fn probe(&self, reading: &SensorReading) -> Result<PowerReading, ClientError>;

    /// Submit an optimization job and return its (unnormalized) plan payload.
    async fn optimize(&self, config: &ComfortConfig) -> Result<Value, ClientError>;
}
