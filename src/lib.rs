//! Comfort Planner: HVAC comfort oracle and schedule optimization client
//!
//! Talks to a backend exposing a fuzzy HVAC "comfort oracle" and an agent
//! crew that plans a 24-hour heating/cooling schedule.
//!
//! ## Architecture
//!
//! - **Probe Client** (`client`): one GET to the oracle, returns fuzzy and naive power
//! - **Optimization Orchestrator** (`planner::Optimizer`): Idle → Running → Succeeded | Failed
//! - **Response Normalizer** (`planner::normalize`): recovers a schedule from
//!   whatever shape the agent crew returned, or falls back to raw text
//! - **Display** (`display`): terminal rendering that tolerates non-numeric cells

pub mod config;
pub mod types;
pub mod client;
pub mod planner;
pub mod display;

// Re-export client configuration
pub use config::{BackendConfig, ClientConfig, ConfigError};

// Re-export commonly used types
pub use types::{
    ComfortConfig, OccupancyProfile, OptimizeEnvelope, PowerReading, ProfileError, Schedule,
    ScheduleEntry, SensorReading,
};

// Re-export client
pub use client::{ApiClient, ClientError, ComfortApi};

// Re-export planner components
pub use planner::{normalize, NormalizedPlan, Optimizer, RunPhase, RunState, RunToken};
