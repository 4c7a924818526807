//! Layered merging of TOML trees with per-field source tracking.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Where a configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigLayer {
    /// Embedded `defaults.toml`.
    Defaults,
    /// The per-user config file.
    User,
    /// A file passed explicitly by the caller.
    File,
    /// A `HERALD_*` environment variable.
    Environment,
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Defaults => "defaults",
            Self::User => "user",
            Self::File => "file",
            Self::Environment => "environment",
        };
        f.write_str(name)
    }
}

/// Dotted field path (e.g. `logging.level`) to the layer that set it.
pub type FieldSources = HashMap<String, ConfigLayer>;

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Deep-merge `overlay` into `base`, recording which layer set each leaf.
///
/// Tables merge per field. Scalars and arrays from the overlay replace the
/// base value.
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
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                    record_leaves(overlay_val, &path, layer, sources);
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            sources.insert(prefix.to_owned(), layer.clone());
        },
    }
}

/// Record every leaf path under `val` as coming from `layer`.
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

    #[test]
    fn test_merge_overrides_scalars_and_keeps_siblings() {
        let mut base: toml::Value =
            toml::from_str("[logging]\nlevel = \"info\"\nformat = \"compact\"").unwrap();
        let overlay: toml::Value = toml::from_str("[logging]\nlevel = \"debug\"").unwrap();
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::File, &mut sources);

        assert_eq!(base["logging"]["level"].as_str(), Some("debug"));
        assert_eq!(base["logging"]["format"].as_str(), Some("compact"));
        assert_eq!(sources.get("logging.level"), Some(&ConfigLayer::File));
        assert!(!sources.contains_key("logging.format"));
    }

    #[test]
    fn test_merge_new_table_records_leaves() {
        let mut base: toml::Value = toml::from_str("[logging]\nlevel = \"info\"").unwrap();
        let overlay: toml::Value =
            toml::from_str("[registry]\ncancel_all = \"strict\"").unwrap();
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::User, &mut sources);

        assert_eq!(base["registry"]["cancel_all"].as_str(), Some("strict"));
        assert_eq!(sources.get("registry.cancel_all"), Some(&ConfigLayer::User));
    }

    #[test]
    fn test_arrays_replace() {
        let mut base: toml::Value =
            toml::from_str("[logging]\ndirectives = [\"a=debug\"]").unwrap();
        let overlay: toml::Value =
            toml::from_str("[logging]\ndirectives = [\"b=trace\"]").unwrap();
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::File, &mut sources);

        let directives = base["logging"]["directives"].as_array().unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].as_str(), Some("b=trace"));
    }
}
