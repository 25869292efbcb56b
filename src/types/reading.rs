//! Comfort oracle probe types

use serde::{Deserialize, Serialize};

/// Instantaneous inputs for one oracle probe.
///
/// Values are passed through unvalidated; bounded input controls are expected
/// to keep them within the oracle's accepted ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Indoor temperature (°C)
    pub indoor: f64,
    /// Occupancy percentage (0..100)
    pub occupancy: f64,
    /// Outdoor temperature (°C)
    pub outdoor: f64,
}

impl SensorReading {
    pub const fn new(indoor: f64, occupancy: f64, outdoor: f64) -> Self {
        Self {
            indoor,
            occupancy,
            outdoor,
        }
    }

    /// Query parameters in wire order.
    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("indoor", self.indoor.to_string()),
            ("occupancy", self.occupancy.to_string()),
            ("outdoor", self.outdoor.to_string()),
        ]
    }
}

impl Default for SensorReading {
    fn default() -> Self {
        Self::new(22.0, 50.0, 20.0)
    }
}

/// Oracle response: fuzzy controller output plus the naive thermostat baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerReading {
    /// Fuzzy controller HVAC power (0..10)
    pub hvac_power: f64,
    /// Naive on/off thermostat power for comparison (0 or 10)
    pub naive_hvac_power: f64,
}

impl PowerReading {
    /// Fuzzy minus naive power. Negative means the fuzzy controller draws less.
    pub fn savings_delta(&self) -> f64 {
        self.hvac_power - self.naive_hvac_power
    }
}
