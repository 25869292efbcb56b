//! Optimization pipeline: run orchestration and response normalization.

mod normalize;
mod orchestrator;

pub use normalize::{normalize, normalize_str, NormalizedPlan};
pub use orchestrator::{Optimizer, RunPhase, RunState, RunToken};
