//! Optimizer Response Normalization
//!
//! The optimizer is an agent crew whose final answer has no guaranteed
//! format. Depending on how its last step finished, the plan may arrive as:
//!
//! - a schedule object
//! - a JSON document encoded in a string
//! - a wrapper object with the JSON text under `output` or `result`
//! - the `{ok: true, plan}` envelope itself
//! - free-form prose
//!
//! [`normalize`] walks a fixed sequence of unwrap rules and stops at the
//! first candidate that has the schedule shape. Anything else becomes
//! displayable text. It never fails.

use serde_json::Value;

use crate::types::Schedule;

/// Outcome of normalization: a structured schedule or text to show as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedPlan {
    Schedule(Schedule),
    Raw(String),
}

impl NormalizedPlan {
    pub const fn schedule(&self) -> Option<&Schedule> {
        match self {
            Self::Schedule(schedule) => Some(schedule),
            Self::Raw(_) => None,
        }
    }

    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::Raw(text) => Some(text),
            Self::Schedule(_) => None,
        }
    }

    pub const fn is_schedule(&self) -> bool {
        matches!(self, Self::Schedule(_))
    }

    /// The payload that produced this result, in a form `normalize` maps back
    /// to the same result.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Schedule(schedule) => schedule.to_value(),
            Self::Raw(text) => Value::String(text.clone()),
        }
    }
}

/// Resolve an arbitrary optimizer payload to a schedule or raw text.
pub fn normalize(value: Value) -> NormalizedPlan {
    let mut candidate = unwrap_envelope(value);

    if let Value::String(text) = candidate {
        match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => candidate = parsed,
            // Unparsable text is shown exactly as received.
            Err(_) => return NormalizedPlan::Raw(text),
        }
    }

    candidate = unwrap_nested_text(candidate);

    match Schedule::from_value(candidate) {
        Ok(schedule) => NormalizedPlan::Schedule(schedule),
        Err(other) => NormalizedPlan::Raw(fallback_text(other)),
    }
}

/// Normalize response text as received off the wire.
pub fn normalize_str(text: &str) -> NormalizedPlan {
    normalize(Value::String(text.to_string()))
}

/// `{ok: true, plan}` → `plan`.
fn unwrap_envelope(value: Value) -> Value {
    let is_envelope = value.get("ok").and_then(Value::as_bool) == Some(true)
        && value.get("plan").is_some();
    match value {
        Value::Object(mut obj) if is_envelope => obj.remove("plan").unwrap_or(Value::Null),
        other => other,
    }
}

/// `{output: "<json>"}` / `{result: "<json>"}` → parsed JSON.
///
/// `output` is unwrapped first and `result` is then looked up on what it
/// produced, so `{output: "{\"result\": \"...\"}"}` unwraps twice. A `result`
/// on the outer wrapper still takes precedence over a parsed `output` that
/// has none. A field whose text does not parse is ignored.
fn unwrap_nested_text(value: Value) -> Value {
    let outer_result = parse_text_field(&value, "result");
    let candidate = parse_text_field(&value, "output").unwrap_or(value);

    match parse_text_field(&candidate, "result") {
        Some(inner) => inner,
        None => outer_result.unwrap_or(candidate),
    }
}

fn parse_text_field(value: &Value, field: &str) -> Option<Value> {
    value
        .get(field)
        .and_then(Value::as_str)
        .and_then(|text| serde_json::from_str::<Value>(text).ok())
}

fn fallback_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
    }
}
