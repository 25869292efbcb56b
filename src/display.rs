//! Terminal rendering for probe readings, schedules, and run states.
//!
//! Schedule cells are untrusted JSON: numbers are formatted to a fixed
//! precision, anything else is printed as received.

use serde_json::Value;

use crate::planner::{NormalizedPlan, RunState};
use crate::types::{PowerReading, Schedule};

const HEADERS: [&str; 5] = [
    "Hr",
    "Setpoint °C",
    "Outdoor °C",
    "Occupancy %",
    "Fuzzy Power (0..10)",
];

/// Placeholder for a cell missing from a short array.
const MISSING: &str = "-";

/// One-line probe summary, e.g. `Fuzzy=4.532  Naive=5.0`.
pub fn format_probe(reading: &PowerReading) -> String {
    format!(
        "Fuzzy={:.3}  Naive={:.1}",
        reading.hvac_power, reading.naive_hvac_power
    )
}

/// Render one cell. `decimals` applies to finite numbers only.
pub fn format_cell(value: Option<&Value>, decimals: Option<usize>) -> String {
    match value {
        None => MISSING.to_string(),
        Some(Value::Number(n)) => match (n.as_f64(), decimals) {
            (Some(f), Some(prec)) if f.is_finite() => format!("{f:.prec$}"),
            _ => n.to_string(),
        },
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Plain-text table of a schedule, one row per entry of `hours`.
pub fn format_schedule_table(schedule: &Schedule) -> String {
    let rows: Vec<[String; 5]> = schedule
        .entries()
        .map(|entry| {
            [
                format_cell(Some(entry.hour), None),
                format_cell(entry.setpoint, Some(1)),
                format_cell(entry.outdoor, Some(1)),
                format_cell(entry.occupancy, None),
                format_cell(entry.power, Some(3)),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &HEADERS[..], &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule[..], &widths);
    for row in &rows {
        push_row(&mut out, &row[..], &widths);
    }
    out
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize; 5]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let cell = cell.as_ref();
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Render a normalized plan: the schedule table, or the raw agent output.
pub fn format_plan(plan: &NormalizedPlan) -> String {
    match plan {
        NormalizedPlan::Schedule(schedule) => {
            let mut out = format!("Schedule ({}h)\n", schedule.len());
            out.push_str(&format_schedule_table(schedule));
            if schedule.is_ragged() {
                out.push_str(&format!(
                    "warning: schedule arrays differ in length {:?}\n",
                    schedule.lengths()
                ));
            }
            out.push_str(&format!("Total fuzzy power: {:.3}\n", schedule.total_power()));
            out
        }
        NormalizedPlan::Raw(text) => format!("Agent output (raw)\n{text}\n"),
    }
}

/// Render whatever the orchestrator currently shows.
pub fn format_run_state(state: &RunState) -> String {
    match state {
        RunState::Idle => "No optimization run yet\n".to_string(),
        RunState::Running { token, started_at } => {
            format!("Optimizing... ({token}, started {})\n", started_at.to_rfc3339())
        }
        RunState::Succeeded { plan, .. } => format_plan(plan),
        RunState::Failed { error, .. } => format!("Error: {error}\n"),
    }
}
