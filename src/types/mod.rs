//! Request/response contracts shared by the probe and optimize pipelines
//!
//! - `SensorReading` / `PowerReading`: comfort oracle probe
//! - `OccupancyProfile` / `ComfortConfig`: optimize request body
//! - `Schedule` / `ScheduleEntry`: 24-hour plan in its parallel-array wire shape
//! - `OptimizeEnvelope`: `{ok, plan}` / `{ok, error}` classification of optimize replies

mod reading;
mod profile;
mod schedule;
mod envelope;

pub use reading::*;
pub use profile::*;
pub use schedule::*;
pub use envelope::*;
