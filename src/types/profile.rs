//! Optimize request body: comfort band, location, and 24-hour occupancy profile

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Hours in one occupancy profile / schedule.
pub const HOURS_PER_DAY: usize = 24;

/// Demo profile: quiet nights, morning ramp, evening peak.
const DEMO_OCCUPANCY: [f64; HOURS_PER_DAY] = [
    20.0, 20.0, 20.0, 20.0, 25.0, 40.0, 60.0, 80.0, 80.0, 80.0, 70.0, 60.0, 60.0, 60.0, 60.0,
    60.0, 70.0, 80.0, 70.0, 50.0, 40.0, 30.0, 25.0, 20.0,
];

/// Occupancy profile rejection reasons.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("occupancy profile needs exactly 24 values, got {0}")]
    Length(usize),
    #[error("occupancy value '{0}' is not a finite number")]
    NotANumber(String),
}

/// Hourly occupancy percentages, hour 0 through 23.
///
/// The length is fixed by the type; serializes as a plain 24-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccupancyProfile([f64; HOURS_PER_DAY]);

impl OccupancyProfile {
    /// Wrap raw values as-is (no clamping).
    pub const fn new(values: [f64; HOURS_PER_DAY]) -> Self {
        Self(values)
    }

    /// Uniform random whole percentages in [0, 100].
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut values = [0.0; HOURS_PER_DAY];
        for v in &mut values {
            *v = f64::from(rng.gen_range(0u8..=100));
        }
        Self::new(values)
    }

    pub const fn values(&self) -> &[f64; HOURS_PER_DAY] {
        &self.0
    }

    /// Copy with every value clamped to [0, 100].
    #[must_use]
    pub fn clamped(mut self) -> Self {
        for v in &mut self.0 {
            *v = v.clamp(0.0, 100.0);
        }
        self
    }
}

impl Default for OccupancyProfile {
    fn default() -> Self {
        Self::new(DEMO_OCCUPANCY)
    }
}

impl TryFrom<Vec<f64>> for OccupancyProfile {
    type Error = ProfileError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        let len = values.len();
        <[f64; HOURS_PER_DAY]>::try_from(values)
            .map(Self::new)
            .map_err(|_| ProfileError::Length(len))
    }
}

/// Text entry form: `"20,20,25 ..."`, separated by commas and/or whitespace.
///
/// Requires exactly 24 finite numbers; values are clamped to [0, 100].
impl FromStr for OccupancyProfile {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| match token.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(ProfileError::NotANumber(token.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::try_from(values)?.clamped())
    }
}

impl std::fmt::Display for OccupancyProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Full configuration for one optimization request.
///
/// `comfort_low <= comfort_high` is expected but not enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComfortConfig {
    pub lat: f64,
    pub lon: f64,
    /// Lower bound of the comfort band (°C)
    pub comfort_low: f64,
    /// Upper bound of the comfort band (°C)
    pub comfort_high: f64,
    pub occupancy: OccupancyProfile,
}

impl Default for ComfortConfig {
    fn default() -> Self {
        Self {
            lat: 43.7,
            lon: -79.4,
            comfort_low: 21.0,
            comfort_high: 24.0,
            occupancy: OccupancyProfile::default(),
        }
    }
}
