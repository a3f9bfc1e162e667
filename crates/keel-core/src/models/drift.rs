use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Before/after for a single field of a resource that doesn't match desired state.
///
/// Carried by `ResourceDeltaDetected` so the history shows what drifted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDrift {
    /// Dotted path into the spec, e.g. `capacity.max`
    pub field: String,
    /// What we want
    pub expected: Value,
    /// What the cloud has (`null` when the field is absent)
    pub actual: Value,
}

/// Field-level comparison of two JSON documents.
///
/// Objects are walked recursively; any other value (arrays included) is
/// compared as a whole. Fields present only in `actual` are ignored; the
/// desired state only constrains what it mentions.
pub fn json_drift(desired: &Value, actual: &Value) -> Vec<FieldDrift> {
    let mut drift = Vec::new();
    walk("", desired, actual, &mut drift);
    drift
}

fn walk(path: &str, desired: &Value, actual: &Value, drift: &mut Vec<FieldDrift>) {
    match (desired, actual) {
        (Value::Object(want), Value::Object(have)) => {
            for (key, want_value) in want {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                let have_value = have.get(key).unwrap_or(&Value::Null);
                walk(&child, want_value, have_value, drift);
            }
        }
        _ if desired == actual => {}
        _ => drift.push(FieldDrift {
            field: if path.is_empty() { "$".into() } else { path.into() },
            expected: desired.clone(),
            actual: actual.clone(),
        }),
    }
}
