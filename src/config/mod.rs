//! Client Configuration Module
//!
//! Backend location and optimize defaults, loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `COMFORT_CONFIG` environment variable (path to TOML file)
//! 2. `comfort_client.toml` in the current working directory
//! 3. Built-in defaults
//!
//! `COMFORT_BACKEND_URL` then overrides `backend.base_url`. The resolved
//! config is passed explicitly to [`crate::client::ApiClient::new`]; nothing
//! in the pipeline reads the environment.
//!
//! ```ignore
//! let mut config = ClientConfig::load();
//! config.apply_env_overrides();
//! let client = ApiClient::new(&config.backend)?;
//! ```

mod client_config;
pub mod validation;

pub use client_config::*;
