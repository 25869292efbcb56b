//! Optimization Orchestrator
//!
//! Runs one optimization job at a time and tracks its visible lifecycle:
//!
//! ```text
//! Idle ──begin──▶ Running ──complete──▶ Succeeded | Failed
//!   ▲                ▲                          │
//!   └──reset─────────┴──────────begin───────────┘
//! ```
//!
//! Every `begin` issues a new [`RunToken`]. A response is applied only if it
//! carries the token of the current run, so a slow reply from a superseded
//! run cannot overwrite a newer one. In-flight requests are never cancelled.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::normalize::{normalize, NormalizedPlan};
use crate::client::{ClientError, ComfortApi};
use crate::types::{ComfortConfig, Schedule};

/// Monotonically increasing identifier of one optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunToken(u64);

impl std::fmt::Display for RunToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Coarse lifecycle phase, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Running => write!(f, "Running"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// What the orchestrator currently has on display.
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    Idle,
    Running {
        token: RunToken,
        started_at: DateTime<Utc>,
    },
    /// Response received. `plan` may be raw text when the optimizer's output
    /// had no recognizable structure; that is still a success.
    Succeeded {
        token: RunToken,
        plan: NormalizedPlan,
        finished_at: DateTime<Utc>,
    },
    Failed {
        token: RunToken,
        error: String,
        finished_at: DateTime<Utc>,
    },
}

impl RunState {
    pub const fn phase(&self) -> RunPhase {
        match self {
            Self::Idle => RunPhase::Idle,
            Self::Running { .. } => RunPhase::Running,
            Self::Succeeded { .. } => RunPhase::Succeeded,
            Self::Failed { .. } => RunPhase::Failed,
        }
    }

    pub const fn token(&self) -> Option<RunToken> {
        match self {
            Self::Idle => None,
            Self::Running { token, .. }
            | Self::Succeeded { token, .. }
            | Self::Failed { token, .. } => Some(*token),
        }
    }

    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub const fn plan(&self) -> Option<&NormalizedPlan> {
        match self {
            Self::Succeeded { plan, .. } => Some(plan),
            _ => None,
        }
    }

    pub const fn schedule(&self) -> Option<&Schedule> {
        match self.plan() {
            Some(plan) => plan.schedule(),
            None => None,
        }
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.plan().and_then(NormalizedPlan::raw_text)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Inner {
    last_token: u64,
    state: RunState,
}

/// Drives optimization runs against a [`ComfortApi`] backend.
///
/// Cheap to share behind an `Arc`; the state lock is never held across an
/// `.await`.
pub struct Optimizer<B: ComfortApi> {
    backend: Arc<B>,
    inner: Mutex<Inner>,
}

impl<B: ComfortApi> Optimizer<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            inner: Mutex::new(Inner {
                last_token: 0,
                state: RunState::Idle,
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| {
            warn!("Optimizer state lock poisoned, recovering");
            e.into_inner()
        })
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RunState {
        self.lock().state.clone()
    }

    /// Start a new run: clears the previous schedule, raw text and error and
    /// enters `Running`. Any run still in flight becomes stale.
    pub fn begin(&self) -> RunToken {
        let mut inner = self.lock();
        inner.last_token += 1;
        let token = RunToken(inner.last_token);
        if inner.state.is_running() {
            debug!(%token, superseded = ?inner.state.token(), "Superseding in-flight run");
        }
        inner.state = RunState::Running {
            token,
            started_at: Utc::now(),
        };
        token
    }

    /// Apply the outcome of run `token`.
    ///
    /// Returns `false` (and changes nothing) when `token` is not the current
    /// run, i.e. the response arrived after a newer `begin` or a `reset`.
    pub fn complete(&self, token: RunToken, outcome: Result<Value, ClientError>) -> bool {
        let mut inner = self.lock();
        let current = match inner.state {
            RunState::Running { token: current, .. } => Some(current),
            _ => None,
        };
        if current != Some(token) {
            debug!(%token, current = ?inner.state.token(), "Dropping stale optimization response");
            return false;
        }

        let finished_at = Utc::now();
        inner.state = match outcome {
            Ok(payload) => {
                let plan = normalize(payload);
                match &plan {
                    NormalizedPlan::Schedule(schedule) => {
                        if schedule.is_ragged() {
                            warn!(%token, lengths = ?schedule.lengths(), "Schedule arrays differ in length");
                        }
                        info!(%token, hours = schedule.len(), "Optimization produced a schedule");
                    }
                    NormalizedPlan::Raw(text) => {
                        info!(%token, chars = text.len(), "Optimization output was not a schedule, keeping raw text");
                    }
                }
                RunState::Succeeded {
                    token,
                    plan,
                    finished_at,
                }
            }
            Err(e) => {
                warn!(%token, error = %e, "Optimization failed");
                RunState::Failed {
                    token,
                    error: e.to_string(),
                    finished_at,
                }
            }
        };
        true
    }

    /// Run one optimization end to end and return the state afterwards.
    ///
    /// If another run was started while this one was in flight, the returned
    /// state is that newer run's.
    pub async fn run(&self, config: &ComfortConfig) -> RunState {
        let token = self.begin();
        info!(%token, "Optimization run started");
        let outcome = self.backend.optimize(config).await;
        self.complete(token, outcome);
        self.state()
    }

    /// Back to `Idle`; pending responses become stale.
    pub fn reset(&self) {
        self.lock().state = RunState::Idle;
    }
}
