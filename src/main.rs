//! Comfort Planner CLI
//!
//! Probes the HVAC comfort oracle and runs 24-hour schedule optimizations
//! against a comfort backend.
//!
//! # Usage
//!
//! ```bash
//! # One oracle read
//! comfort-planner probe --indoor 22 --occupancy 50 --outdoor 20
//!
//! # Optimize a day with the demo occupancy profile
//! comfort-planner optimize --lat 43.7 --lon -79.4
//!
//! # Decode a saved optimizer response offline
//! comfort-planner normalize response.json
//! ```
//!
//! # Environment Variables
//!
//! - `COMFORT_CONFIG`: Path to the client config TOML
//! - `COMFORT_BACKEND_URL`: Backend base URL (default: http://localhost:8000)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use comfort_planner::display::{format_plan, format_probe, format_run_state};
use comfort_planner::planner::normalize_str;
use comfort_planner::{
    normalize, ApiClient, ClientConfig, ComfortApi, ComfortConfig, OccupancyProfile,
    OptimizeEnvelope, Optimizer, RunPhase, SensorReading,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "comfort-planner")]
#[command(about = "HVAC comfort oracle probe and schedule optimization client")]
#[command(version)]
struct CliArgs {
    /// Client config TOML (default: $COMFORT_CONFIG, then ./comfort_client.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the backend base URL (also: COMFORT_BACKEND_URL)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Query the comfort oracle once
    Probe {
        /// Indoor temperature (°C)
        #[arg(long, default_value_t = 22.0, allow_negative_numbers = true)]
        indoor: f64,
        /// Occupancy (%)
        #[arg(long, default_value_t = 50.0)]
        occupancy: f64,
        /// Outdoor temperature (°C)
        #[arg(long, default_value_t = 20.0, allow_negative_numbers = true)]
        outdoor: f64,
    },

    /// Run the agent optimizer for a 24-hour schedule
    Optimize {
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Lower comfort bound (°C)
        #[arg(long, allow_negative_numbers = true)]
        comfort_low: Option<f64>,
        /// Upper comfort bound (°C)
        #[arg(long, allow_negative_numbers = true)]
        comfort_high: Option<f64>,
        /// 24 comma-separated occupancy percentages (default: demo profile)
        #[arg(long, conflicts_with = "random_occupancy")]
        occupancy: Option<OccupancyProfile>,
        /// Use 24 random occupancy values in [0, 100]
        #[arg(long)]
        random_occupancy: bool,
        /// Print the normalized result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Normalize a saved optimizer response (file or stdin) without a backend
    Normalize {
        /// Response file; reads stdin when omitted
        file: Option<PathBuf>,
    },
}

// ============================================================================
// Setup
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(path: Option<&Path>, base_url: Option<&str>) -> Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClientConfig::load(),
    };
    config.apply_env_overrides();
    if let Some(url) = base_url {
        config.override_base_url(url);
    }
    config.validate().context("Invalid client configuration")?;
    Ok(config)
}

// ============================================================================
// Commands
// ============================================================================

async fn run_probe(client: &ApiClient, reading: SensorReading) -> Result<ExitCode> {
    let power = client
        .probe(&reading)
        .await
        .context("Comfort oracle probe failed")?;
    info!(
        savings_delta = power.savings_delta(),
        "Fuzzy minus naive HVAC power"
    );
    println!("Probe ok: {}", format_probe(&power));
    Ok(ExitCode::SUCCESS)
}

async fn run_optimize(client: ApiClient, request: ComfortConfig, json: bool) -> Result<ExitCode> {
    let optimizer = Optimizer::new(Arc::new(client));
    info!(
        base_url = optimizer.backend().base_url(),
        occupancy = %request.occupancy,
        "Running agent optimization"
    );
    let state = optimizer.run(&request).await;

    match (json, state.plan()) {
        (true, Some(plan)) => {
            let rendered = serde_json::to_string_pretty(&plan.to_value())
                .context("Failed to render plan as JSON")?;
            println!("{rendered}");
        }
        _ => print!("{}", format_run_state(&state)),
    }

    if state.phase() == RunPhase::Failed {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_normalize(file: Option<&Path>) -> Result<ExitCode> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    // A saved body may still carry the {ok, plan} envelope.
    let plan = match serde_json::from_str::<Value>(&text) {
        Ok(body) => match OptimizeEnvelope::classify(body).into_plan() {
            Ok(payload) => normalize(payload),
            Err(rejection) => {
                println!("Error: {rejection}");
                return Ok(ExitCode::FAILURE);
            }
        },
        Err(_) => normalize_str(&text),
    };
    print!("{}", format_plan(&plan));
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let CliArgs {
        config,
        base_url,
        log_json,
        command,
    } = CliArgs::parse();
    init_logging(log_json);

    let backend = || -> Result<(ClientConfig, ApiClient)> {
        let config = load_config(config.as_deref(), base_url.as_deref())?;
        let client = ApiClient::new(&config.backend).context("Failed to build HTTP client")?;
        Ok((config, client))
    };

    match command {
        SubCommand::Normalize { file } => run_normalize(file.as_deref()),
        SubCommand::Probe {
            indoor,
            occupancy,
            outdoor,
        } => {
            let (_, client) = backend()?;
            run_probe(&client, SensorReading::new(indoor, occupancy, outdoor)).await
        }
        SubCommand::Optimize {
            lat,
            lon,
            comfort_low,
            comfort_high,
            occupancy,
            random_occupancy,
            json,
        } => {
            let (config, client) = backend()?;
            let profile = if random_occupancy {
                OccupancyProfile::random(&mut rand::thread_rng())
            } else {
                occupancy.unwrap_or_default()
            };
            let mut request = config.comfort_config(profile);
            request.lat = lat.unwrap_or(request.lat);
            request.lon = lon.unwrap_or(request.lon);
            request.comfort_low = comfort_low.unwrap_or(request.comfort_low);
            request.comfort_high = comfort_high.unwrap_or(request.comfort_high);
            run_optimize(client, request, json).await
        }
    }
}
