//! Allowlist projection of untrusted form data.

use serde_json::{Map, Value};

/// Keep only the `allowed` keys present in `source`.
///
/// Values are copied verbatim. A key mapped to JSON `null` counts as
/// present; absent keys stay absent and are never defaulted.
#[must_use]
pub fn sanitize(source: &Map<String, Value>, allowed: &[&str]) -> Map<String, Value> {
    allowed
        .iter()
        .filter_map(|key| {
            source
                .get(*key)
                .map(|value| ((*key).to_string(), value.clone()))
        })
        .collect()
}
