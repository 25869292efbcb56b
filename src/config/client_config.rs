//! Client configuration: backend location and optimize-request defaults
//!
//! Every struct implements `Default`, so an empty or missing file yields a
//! working configuration pointed at a local backend.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::types::{ComfortConfig, OccupancyProfile};

/// Env var naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "COMFORT_CONFIG";
/// Env var overriding `backend.base_url`.
pub const BACKEND_URL_ENV: &str = "COMFORT_BACKEND_URL";
/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "comfort_client.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root client configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Where the oracle and optimizer live
    #[serde(default)]
    pub backend: BackendConfig,

    /// Defaults for optimize requests
    #[serde(default)]
    pub optimize: OptimizeDefaults,
}

impl ClientConfig {
    /// Load configuration using the standard search order:
    /// 1. `$COMFORT_CONFIG`
    /// 2. `./comfort_client.toml`
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), base_url = %config.backend.base_url, "Loaded client config from COMFORT_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from COMFORT_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "COMFORT_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./comfort_client.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(base_url = %config.backend.base_url, "Loaded client config from ./comfort_client.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./comfort_client.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No comfort_client.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate TOML text. Unknown keys are logged, not rejected.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `COMFORT_BACKEND_URL` if set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            self.override_base_url(&url);
        }
    }

    /// Replace the backend base URL (blank values are ignored).
    pub fn override_base_url(&mut self, url: &str) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }
        info!(from = %self.backend.base_url, to = %url, "Backend URL overridden");
        self.backend.base_url = url.to_string();
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Reject impossible values. Suspicious-but-usable values are only logged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Build an optimize request from the configured defaults.
    pub fn comfort_config(&self, occupancy: OccupancyProfile) -> ComfortConfig {
        ComfortConfig {
            lat: self.optimize.lat,
            lon: self.optimize.lon,
            comfort_low: self.optimize.comfort_low,
            comfort_high: self.optimize.comfort_high,
            occupancy,
        }
    }
}

// ============================================================================
// Backend Config
// ============================================================================

/// Backend location and transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL both endpoints are resolved against.
    ///
    /// Can be overridden by `COMFORT_BACKEND_URL` or `--base-url`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout. Absent means the HTTP client's default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl BackendConfig {
    /// The base URL, if it parses.
    pub fn parsed_url(&self) -> Option<Url> {
        Url::parse(&self.base_url).ok()
    }
}

// ============================================================================
// Optimize Defaults
// ============================================================================

/// Location and comfort band used when the CLI does not override them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizeDefaults {
    #[serde(default = "default_lat")]
    pub lat: f64,
    #[serde(default = "default_lon")]
    pub lon: f64,
    /// Lower comfort bound (°C)
    #[serde(default = "default_comfort_low")]
    pub comfort_low: f64,
    /// Upper comfort bound (°C)
    #[serde(default = "default_comfort_high")]
    pub comfort_high: f64,
}

fn default_lat() -> f64 {
    43.7
}
fn default_lon() -> f64 {
    -79.4
}
fn default_comfort_low() -> f64 {
    21.0
}
fn default_comfort_high() -> f64 {
    24.0
}

impl Default for OptimizeDefaults {
    fn default() -> Self {
        Self {
            lat: default_lat(),
            lon: default_lon(),
            comfort_low: default_comfort_low(),
            comfort_high: default_comfort_high(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Tests
// ============================================================================
