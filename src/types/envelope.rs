//! Optimize reply envelope: `{ok: true, plan}` or `{ok: false, error}`

use serde_json::Value;

/// Fallback error text when the optimizer says `ok: false` without a message.
pub const UNSPECIFIED_FAILURE: &str = "optimizer reported failure";

/// Classified 2xx body from the optimize endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeEnvelope {
    /// `{ok: true, plan}`. An absent `plan` key yields empty text, so nothing
    /// is shown; an explicit `null` is kept.
    Accepted(Value),
    /// `{ok: false, error}` with the server's error text.
    Rejected(String),
    /// No boolean `ok` field; the whole body is the payload.
    Bare(Value),
}

impl OptimizeEnvelope {
    pub fn classify(body: Value) -> Self {
        let ok = body.get("ok").and_then(Value::as_bool);
        match (ok, body) {
            (Some(true), Value::Object(mut obj)) => {
                Self::Accepted(
                    obj.remove("plan")
                        .unwrap_or_else(|| Value::String(String::new())),
                )
            }
            (Some(false), Value::Object(obj)) => Self::Rejected(match obj.get("error") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => UNSPECIFIED_FAILURE.to_string(),
                Some(other) => other.to_string(),
            }),
            (_, body) => Self::Bare(body),
        }
    }

    /// Payload to normalize, or the rejection text.
    pub fn into_plan(self) -> Result<Value, String> {
        match self {
            Self::Accepted(plan) | Self::Bare(plan) => Ok(plan),
            Self::Rejected(error) => Err(error),
        }
    }
}
