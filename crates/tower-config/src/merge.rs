//! Deep merge of TOML value trees.
//!
//! Merging happens on raw [`toml::Value`] trees rather than deserialized
//! structs, so a key missing from an overlay never overrides the base.

use std::collections::HashMap;

/// Which configuration layer a value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Compiled-in defaults (`defaults.toml`).
    Defaults,
    /// User-level configuration (`~/.tower/config.toml`).
    User,
    /// File passed explicitly on the command line.
    Explicit,
    /// Environment variable fallback.
    Environment,
}

impl std::fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defaults => write!(f, "defaults"),
            Self::User => write!(f, "user (~/.tower/config.toml)"),
            Self::Explicit => write!(f, "explicit (--config)"),
            Self::Environment => write!(f, "environment variable"),
        }
    }
}

/// Tracks which layer set each dotted field path.
pub type FieldSources = HashMap<String, ConfigLayer>;

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Deep-merge `overlay` into `base`, recording the layer of each leaf it sets.
///
/// Tables merge per key. Scalars and arrays from the overlay replace the base.
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = join(prefix, key);
                match base_table.get_mut(key) {
                    Some(base_val) if overlay_val.is_table() && base_val.is_table() => {
                        deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
                    },
                    Some(base_val) => {
                        *base_val = overlay_val.clone();
                        record_leaves(overlay_val, &path, layer, sources);
                    },
                    None => {
                        base_table.insert(key.clone(), overlay_val.clone());
                        record_leaves(overlay_val, &path, layer, sources);
                    },
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            sources.insert(prefix.to_owned(), layer.clone());
        },
    }
}

/// Walk a value tree and record every leaf path with the given layer.
pub fn record_leaves(
    val: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            record_leaves(child, &join(prefix, key), layer, sources);
        }
    } else {
        sources.insert(prefix.to_owned(), layer.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_overlay_replaces_scalars_and_keeps_siblings() {
        let mut base = parse(
            r#"
            [gateway]
            timeout_secs = 30
            [logging]
            level = "info"
            format = "compact"
        "#,
        );
        let overlay = parse(
            r#"
            [logging]
            level = "debug"
        "#,
        );

        let mut sources = FieldSources::new();
        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::User, &mut sources);

        assert_eq!(base["logging"]["level"].as_str(), Some("debug"));
        assert_eq!(base["logging"]["format"].as_str(), Some("compact"));
        assert_eq!(base["gateway"]["timeout_secs"].as_integer(), Some(30));
        assert_eq!(sources.get("logging.level"), Some(&ConfigLayer::User));
        assert!(!sources.contains_key("logging.format"));
    }

    #[test]
    fn test_arrays_replace() {
        let mut base = parse(r#"roles = ["member", "admin"]"#);
        let overlay = parse(r#"roles = ["curator"]"#);
        let mut sources = FieldSources::new();
        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::Explicit, &mut sources);
        assert_eq!(base["roles"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_new_table_records_all_leaves() {
        let mut base = parse("[logging]\nlevel = \"info\"");
        let overlay = parse("[drafts.member]\ndefault_tier = \"pro\"");
        let mut sources = FieldSources::new();
        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::User, &mut sources);
        assert_eq!(
            sources.get("drafts.member.default_tier"),
            Some(&ConfigLayer::User)
        );
    }
}
