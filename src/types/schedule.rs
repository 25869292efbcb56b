//! 24-hour plan in its parallel-array wire shape
//!
//! The optimizer returns five arrays of equal (nominal) length rather than a
//! list of per-hour records. Elements stay as raw JSON values: nothing here
//! checks that they are numbers or that the arrays line up, so whatever the
//! optimizer sent is what gets displayed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field names that make an object a schedule, in wire order.
pub const SCHEDULE_FIELDS: [&str; 5] = ["hours", "setpoints", "outdoor", "occupancy", "power"];

/// Optimizer schedule: five parallel arrays indexed by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub hours: Vec<Value>,
    /// Setpoint temperature per hour (°C)
    pub setpoints: Vec<Value>,
    /// Outdoor temperature forecast per hour (°C)
    pub outdoor: Vec<Value>,
    /// Occupancy per hour (%)
    pub occupancy: Vec<Value>,
    /// Fuzzy HVAC power per hour (0..10)
    pub power: Vec<Value>,
    /// Any other keys the optimizer attached; kept so the object round-trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One row of a schedule. Cells are `None` when that array is shorter than `hours`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleEntry<'a> {
    pub index: usize,
    pub hour: &'a Value,
    pub setpoint: Option<&'a Value>,
    pub outdoor: Option<&'a Value>,
    pub occupancy: Option<&'a Value>,
    pub power: Option<&'a Value>,
}

impl Schedule {
    pub fn new(
        hours: Vec<Value>,
        setpoints: Vec<Value>,
        outdoor: Vec<Value>,
        occupancy: Vec<Value>,
        power: Vec<Value>,
    ) -> Self {
        Self {
            hours,
            setpoints,
            outdoor,
            occupancy,
            power,
            extra: Map::new(),
        }
    }

    /// Whether `value` has the schedule shape: an object whose five schedule
    /// fields are all present and all arrays. Element types are not checked.
    pub fn matches_shape(value: &Value) -> bool {
        value.as_object().is_some_and(|obj| {
            SCHEDULE_FIELDS
                .iter()
                .all(|field| obj.get(*field).is_some_and(Value::is_array))
        })
    }

    /// Convert a JSON value into a schedule, handing the value back untouched
    /// when it does not have the schedule shape.
    pub fn from_value(value: Value) -> Result<Self, Value> {
        if !Self::matches_shape(&value) {
            return Err(value);
        }
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => return Err(other),
        };

        let mut take = |field: &str| match obj.remove(field) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let hours = take("hours");
        let setpoints = take("setpoints");
        let outdoor = take("outdoor");
        let occupancy = take("occupancy");
        let power = take("power");

        Ok(Self {
            hours,
            setpoints,
            outdoor,
            occupancy,
            power,
            extra: obj,
        })
    }

    /// Back to the wire shape.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("hours".into(), Value::Array(self.hours.clone()));
        obj.insert("setpoints".into(), Value::Array(self.setpoints.clone()));
        obj.insert("outdoor".into(), Value::Array(self.outdoor.clone()));
        obj.insert("occupancy".into(), Value::Array(self.occupancy.clone()));
        obj.insert("power".into(), Value::Array(self.power.clone()));
        for (k, v) in &self.extra {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }

    /// Number of rows, driven by `hours`.
    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    /// Lengths of the five arrays in wire order.
    pub fn lengths(&self) -> [usize; 5] {
        [
            self.hours.len(),
            self.setpoints.len(),
            self.outdoor.len(),
            self.occupancy.len(),
            self.power.len(),
        ]
    }

    /// True when the five arrays do not all have the same length.
    pub fn is_ragged(&self) -> bool {
        let lengths = self.lengths();
        lengths.iter().any(|&len| len != lengths[0])
    }

    /// Record-per-hour view over the parallel arrays.
    pub fn entries(&self) -> impl Iterator<Item = ScheduleEntry<'_>> + '_ {
        self.hours.iter().enumerate().map(|(index, hour)| ScheduleEntry {
            index,
            hour,
            setpoint: self.setpoints.get(index),
            outdoor: self.outdoor.get(index),
            occupancy: self.occupancy.get(index),
            power: self.power.get(index),
        })
    }

    /// Sum of numeric power cells; non-numeric cells are skipped.
    pub fn total_power(&self) -> f64 {
        self.power.iter().filter_map(Value::as_f64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "hours": [0, 1, 2],
            "setpoints": [21.0, 21.5, 22.0],
            "outdoor": [5.2, 4.8, "n/a"],
            "occupancy": [20, 20, 25],
            "power": [1.25, 1.5, 2.0]
        })
    }

    #[test]
    fn shape_requires_all_five_arrays() {
        assert!(Schedule::matches_shape(&sample()));

        let mut missing = sample();
        missing.as_object_mut().unwrap().remove("power");
        assert!(!Schedule::matches_shape(&missing));

        let mut not_array = sample();
        not_array["outdoor"] = json!("cold");
        assert!(!Schedule::matches_shape(&not_array));

        assert!(!Schedule::matches_shape(&json!(null)));
        assert!(!Schedule::matches_shape(&json!([1, 2, 3])));
    }

    #[test]
    fn from_value_keeps_elements_verbatim() {
        let schedule = Schedule::from_value(sample()).unwrap();
        assert_eq!(schedule.outdoor[2], json!("n/a"));
        assert_eq!(schedule.len(), 3);
        assert!(!schedule.is_ragged());
    }

    #[test]
    fn from_value_returns_input_on_mismatch() {
        let value = json!({"foo": 1});
        assert_eq!(Schedule::from_value(value.clone()), Err(value));
    }

    #[test]
    fn wire_shape_round_trips_with_extra_keys() {
        let mut value = sample();
        value["notes"] = json!("pre-cool before 07:00");
        let schedule = Schedule::from_value(value.clone()).unwrap();
        assert_eq!(schedule.extra["notes"], json!("pre-cool before 07:00"));
        assert_eq!(schedule.to_value(), value);
        assert_eq!(serde_json::to_value(&schedule).unwrap(), value);
    }

    #[test]
    fn ragged_arrays_yield_missing_cells() {
        let value = json!({
            "hours": [0, 1, 2],
            "setpoints": [21.0],
            "outdoor": [],
            "occupancy": [20, 20, 25],
            "power": [1.0, 2.0, 3.0, 4.0]
        });
        let schedule = Schedule::from_value(value).unwrap();
        assert!(schedule.is_ragged());
        assert_eq!(schedule.lengths(), [3, 1, 0, 3, 4]);

        let rows: Vec<_> = schedule.entries().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].setpoint, None);
        assert_eq!(rows[0].outdoor, None);
        assert_eq!(rows[2].power, Some(&json!(3.0)));
    }

    #[test]
    fn total_power_skips_non_numeric_cells() {
        let schedule = Schedule::new(
            vec![json!(0), json!(1), json!(2)],
            vec![],
            vec![],
            vec![],
            vec![json!(1.5), json!("oops"), json!(2.5)],
        );
        assert!((schedule.total_power() - 4.0).abs() < 1e-9);
    }
}
