//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for ClientConfig.
///
/// Any new field added to ClientConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [backend]
        "backend",
        "backend.base_url",
        "backend.request_timeout_secs",
        // [optimize]
        "optimize",
        "optimize.lat",
        "optimize.lon",
        "optimize.comfort_low",
        "optimize.comfort_high",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the lexicographically smallest key so output is stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Validate value ranges on a parsed ClientConfig.
///
/// Returns (errors, warnings): errors must prevent startup; warnings are
/// suspicious but usable.
pub fn validate_ranges(config: &super::ClientConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let backend = &config.backend;
    match backend.parsed_url() {
        None => errors.push(format!(
            "backend.base_url = '{}' is not a valid absolute URL",
            backend.base_url
        )),
        Some(url) if !matches!(url.scheme(), "http" | "https") => errors.push(format!(
            "backend.base_url scheme '{}' is not http or https",
            url.scheme()
        )),
        Some(_) => {}
    }

    if backend.request_timeout_secs == Some(0) {
        errors.push("backend.request_timeout_secs must be > 0 (omit it for no timeout)".to_string());
    }

    let opt = &config.optimize;
    for (name, value) in [
        ("optimize.lat", opt.lat),
        ("optimize.lon", opt.lon),
        ("optimize.comfort_low", opt.comfort_low),
        ("optimize.comfort_high", opt.comfort_high),
    ] {
        if !value.is_finite() {
            errors.push(format!("{name} = {value} must be a finite number"));
        }
    }

    if opt.lat.abs() > 90.0 {
        errors.push(format!("optimize.lat = {:.4} is outside [-90, 90]", opt.lat));
    }
    if opt.lon.abs() > 180.0 {
        errors.push(format!("optimize.lon = {:.4} is outside [-180, 180]", opt.lon));
    }

    // Inverted band is passed through to the optimizer as-is
    if opt.comfort_low > opt.comfort_high {
        warnings.push(ValidationWarning {
            field: "optimize.comfort_low".to_string(),
            message: format!(
                "optimize.comfort_low = {:.1} is above comfort_high = {:.1}",
                opt.comfort_low, opt.comfort_high
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
