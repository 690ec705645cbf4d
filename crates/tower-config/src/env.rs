use std::collections::HashMap;

use crate::merge::{ConfigLayer, FieldSources};

/// Environment variables mapped onto config fields.
///
/// Each applies only when no file layer has set the field.
const ENV_FALLBACKS: &[(&str, &str)] = &[
    ("TOWER_GATEWAY_URL", "gateway.url"),
    ("TOWER_GATEWAY_KEY", "gateway.api_key"),
    ("TOWER_GATEWAY_SCHEMA", "gateway.schema"),
    ("ANTHROPIC_API_KEY", "assistant.api_key"),
    ("TOWER_ASSISTANT_MODEL", "assistant.model"),
    ("TOWER_LOG_LEVEL", "logging.level"),
];

/// Snapshot the `TOWER_*` and `ANTHROPIC_*` environment variables.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("TOWER_") || k.starts_with("ANTHROPIC_"))
        .collect()
}

/// Apply environment fallbacks for fields that are unset or still at their
/// embedded default. Returns how many fields were filled.
pub fn apply_env_fallbacks(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String>,
) -> usize {
    let mut applied: usize = 0;
    for (var, path) in ENV_FALLBACKS {
        let Some(value) = env_vars.get(*var).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let overridable = sources
            .get(*path)
            .is_none_or(|layer| *layer == ConfigLayer::Defaults);
        if !overridable {
            continue;
        }
        if set_path(merged, path, toml::Value::String(value.clone())) {
            sources.insert((*path).to_owned(), ConfigLayer::Environment);
            applied = applied.saturating_add(1);
        }
    }
    applied
}

/// Set a dotted path, creating intermediate tables. Returns `false` if a
/// non-table value is in the way.
fn set_path(root: &mut toml::Value, path: &str, value: toml::Value) -> bool {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return false;
    };
    let mut current = root;
    for segment in segments {
        let Some(table) = current.as_table_mut() else {
            return false;
        };
        current = table
            .entry(segment.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
    match current.as_table_mut() {
        Some(table) => {
            table.insert(last.to_owned(), value);
            true
        },
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_fills_unset_fields() {
        let mut merged: toml::Value = toml::from_str("[gateway]\ntimeout_secs = 30").unwrap();
        let mut sources = FieldSources::new();
        let count = apply_env_fallbacks(
            &mut merged,
            &mut sources,
            &env(&[
                ("TOWER_GATEWAY_URL", "https://abc.example.co"),
                ("ANTHROPIC_API_KEY", "sk-ant"),
            ]),
        );
        assert_eq!(count, 2);
        assert_eq!(merged["gateway"]["url"].as_str(), Some("https://abc.example.co"));
        assert_eq!(merged["assistant"]["api_key"].as_str(), Some("sk-ant"));
        assert_eq!(sources.get("gateway.url"), Some(&ConfigLayer::Environment));
    }

    #[test]
    fn test_file_values_win() {
        let mut merged: toml::Value =
            toml::from_str("[gateway]\nurl = \"https://from-file.example.co\"").unwrap();
        let mut sources = FieldSources::new();
        sources.insert("gateway.url".to_owned(), ConfigLayer::User);
        let count = apply_env_fallbacks(
            &mut merged,
            &mut sources,
            &env(&[("TOWER_GATEWAY_URL", "https://from-env.example.co")]),
        );
        assert_eq!(count, 0);
        assert_eq!(
            merged["gateway"]["url"].as_str(),
            Some("https://from-file.example.co")
        );
    }

    #[test]
    fn test_env_overrides_defaults() {
        let mut merged: toml::Value = toml::from_str("[logging]\nlevel = \"info\"").unwrap();
        let mut sources = FieldSources::new();
        sources.insert("logging.level".to_owned(), ConfigLayer::Defaults);
        apply_env_fallbacks(&mut merged, &mut sources, &env(&[("TOWER_LOG_LEVEL", "debug")]));
        assert_eq!(merged["logging"]["level"].as_str(), Some("debug"));
    }

    #[test]
    fn test_blank_values_ignored() {
        let mut merged: toml::Value = toml::from_str("").unwrap();
        let mut sources = FieldSources::new();
        let count =
            apply_env_fallbacks(&mut merged, &mut sources, &env(&[("TOWER_GATEWAY_KEY", " ")]));
        assert_eq!(count, 0);
    }
}
