//! Configuration: caps, feature flags, and property-safety policy for one
//! `validate_schema` run, plus the three named presets and the partial
//! overrides record that can be deep-merged onto any of them.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const OVERRIDES_FILE_NAME: &str = ".zchkrc.json";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySafety {
    #[serde(default)]
    pub allowed_prefixes: Vec<String>,
    #[serde(default)]
    pub denied_prefixes: Vec<String>,
    #[serde(default)]
    pub allowed_properties: HashSet<String>,
    #[serde(default)]
    pub denied_properties: HashSet<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaUnification {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub unwrap_array_root: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub timeout_ms: u64,
    pub max_node_count: u64,
    pub max_object_depth: u32,
    pub max_chain_depth: u32,
    pub max_argument_nesting: u32,
    pub max_properties_per_object: usize,
    pub max_string_length: usize,
    pub allow_computed_properties: bool,
    #[serde(default)]
    pub allow_loops: bool,
    #[serde(default)]
    pub allow_template_exprs: bool,
    #[serde(default = "default_true")]
    pub enable_caching: bool,
    pub property_safety: PropertySafety,
    #[serde(default)]
    pub schema_unification: SchemaUnification,
}

fn default_true() -> bool {
    true
}

/// Partial overrides record: every field optional, deep-merged onto a
/// preset. List fields are unioned rather than replaced, matching the
/// "deep-merge" wording in the external-interfaces contract.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    pub timeout_ms: Option<u64>,
    pub max_node_count: Option<u64>,
    pub max_object_depth: Option<u32>,
    pub max_chain_depth: Option<u32>,
    pub max_argument_nesting: Option<u32>,
    pub max_properties_per_object: Option<usize>,
    pub max_string_length: Option<usize>,
    pub allow_computed_properties: Option<bool>,
    pub allow_loops: Option<bool>,
    pub allow_template_exprs: Option<bool>,
    pub enable_caching: Option<bool>,
    #[serde(default)]
    pub allowed_prefixes: Vec<String>,
    #[serde(default)]
    pub denied_prefixes: Vec<String>,
    #[serde(default)]
    pub allowed_properties: Vec<String>,
    #[serde(default)]
    pub denied_properties: Vec<String>,
    pub schema_unification_enabled: Option<bool>,
    pub unwrap_array_root: Option<bool>,
}

impl Config {
    /// Overlay `overrides` onto `self`, consuming neither and returning the
    /// merged result. Scalars replace; the `PropertySafety` lists/sets union.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Config {
        let mut merged = self.clone();
        macro_rules! scalar {
            ($field:ident) => {
                if let Some(value) = overrides.$field {
                    merged.$field = value;
                }
            };
        }
        scalar!(timeout_ms);
        scalar!(max_node_count);
        scalar!(max_object_depth);
        scalar!(max_chain_depth);
        scalar!(max_argument_nesting);
        scalar!(max_properties_per_object);
        scalar!(max_string_length);
        scalar!(allow_computed_properties);
        scalar!(allow_loops);
        scalar!(allow_template_exprs);
        scalar!(enable_caching);

        if let Some(value) = overrides.schema_unification_enabled {
            merged.schema_unification.enabled = value;
        }
        if let Some(value) = overrides.unwrap_array_root {
            merged.schema_unification.unwrap_array_root = value;
        }

        merged
            .property_safety
            .allowed_prefixes
            .extend(overrides.allowed_prefixes.iter().cloned());
        merged
            .property_safety
            .denied_prefixes
            .extend(overrides.denied_prefixes.iter().cloned());
        merged
            .property_safety
            .allowed_properties
            .extend(overrides.allowed_properties.iter().cloned());
        merged
            .property_safety
            .denied_properties
            .extend(overrides.denied_properties.iter().cloned());

        merged
    }
}

pub mod presets {
    use super::{Config, PropertySafety, SchemaUnification};
    use std::collections::HashSet;

    fn denied(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// The loosest of the three presets: generous limits, a narrow deny-list.
    /// Suitable for trusted or lightly-screened input.
    pub fn relaxed() -> Config {
        Config {
            timeout_ms: 30_000,
            max_node_count: 1_000_000,
            max_object_depth: 10,
            max_chain_depth: 10,
            max_argument_nesting: 8,
            max_properties_per_object: 1_000,
            max_string_length: 10_000,
            allow_computed_properties: true,
            allow_loops: false,
            allow_template_exprs: false,
            enable_caching: true,
            property_safety: PropertySafety {
                allowed_prefixes: Vec::new(),
                denied_prefixes: vec!["__".to_string()],
                allowed_properties: HashSet::new(),
                denied_properties: denied(&["__proto__", "constructor"]),
            },
            schema_unification: SchemaUnification::default(),
        }
    }

    /// A middle ground: tighter caps, a wider deny-list that also blocks
    /// names that read through to the host environment.
    pub fn medium() -> Config {
        Config {
            timeout_ms: 10_000,
            max_node_count: 100_000,
            max_object_depth: 6,
            max_chain_depth: 6,
            max_argument_nesting: 4,
            max_properties_per_object: 200,
            max_string_length: 2_000,
            allow_computed_properties: false,
            allow_loops: false,
            allow_template_exprs: false,
            enable_caching: true,
            property_safety: PropertySafety {
                allowed_prefixes: Vec::new(),
                denied_prefixes: vec!["__".to_string(), "_".to_string()],
                allowed_properties: HashSet::new(),
                denied_properties: denied(&[
                    "__proto__",
                    "constructor",
                    "prototype",
                    "eval",
                    "arguments",
                    "process",
                    "global",
                    "window",
                    "document",
                ]),
            },
            schema_unification: SchemaUnification::default(),
        }
    }

    /// The tightest preset: strict caps, for input of unknown provenance
    /// (the default posture for generator output that has not been screened).
    pub fn extremely_safe() -> Config {
        Config {
            timeout_ms: 1_000,
            max_node_count: 1_000,
            max_object_depth: 3,
            max_chain_depth: 3,
            max_argument_nesting: 2,
            max_properties_per_object: 20,
            max_string_length: 100,
            allow_computed_properties: false,
            allow_loops: false,
            allow_template_exprs: false,
            enable_caching: true,
            property_safety: PropertySafety {
                allowed_prefixes: Vec::new(),
                denied_prefixes: vec!["_".to_string(), "$".to_string()],
                allowed_properties: HashSet::new(),
                denied_properties: denied(&[
                    "__proto__",
                    "constructor",
                    "prototype",
                    "eval",
                    "arguments",
                    "process",
                    "global",
                    "window",
                    "document",
                ]),
            },
            schema_unification: SchemaUnification::default(),
        }
    }
}

pub fn default_overrides_json() -> Result<String> {
    serde_json::to_string_pretty(&ConfigOverrides::default())
        .context("Failed to generate default overrides file.")
}

pub fn find_overrides_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let candidate = current.join(OVERRIDES_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

pub struct OverridesLoadResult {
    pub overrides: ConfigOverrides,
    pub from_file: bool,
}

pub fn load_overrides(start_dir: &Path) -> Result<OverridesLoadResult> {
    match find_overrides_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let overrides: ConfigOverrides = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse overrides file: {:?}", path))?;
            Ok(OverridesLoadResult {
                overrides,
                from_file: true,
            })
        }
        None => Ok(OverridesLoadResult {
            overrides: ConfigOverrides::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn presets_are_monotonically_tighter() {
        let safe = presets::extremely_safe();
        let medium = presets::medium();
        let relaxed = presets::relaxed();

        assert!(safe.max_node_count < medium.max_node_count);
        assert!(medium.max_node_count < relaxed.max_node_count);
        assert!(safe.timeout_ms < medium.timeout_ms);
        assert!(medium.timeout_ms < relaxed.timeout_ms);
        assert!(safe.max_chain_depth <= medium.max_chain_depth);
        assert!(medium.max_chain_depth <= relaxed.max_chain_depth);
        assert!(
            safe.property_safety.denied_properties.len()
                >= medium.property_safety.denied_properties.len()
        );
    }

    #[test]
    fn overrides_union_denied_properties() {
        let base = presets::relaxed();
        let overrides = ConfigOverrides {
            denied_properties: vec!["dangerous".to_string()],
            ..Default::default()
        };
        let merged = base.with_overrides(&overrides);
        assert!(merged.property_safety.denied_properties.contains("dangerous"));
        assert!(merged.property_safety.denied_properties.contains("constructor"));
    }

    #[test]
    fn overrides_replace_scalars() {
        let base = presets::relaxed();
        let overrides = ConfigOverrides {
            timeout_ms: Some(500),
            unwrap_array_root: Some(true),
            ..Default::default()
        };
        let merged = base.with_overrides(&overrides);
        assert_eq!(merged.timeout_ms, 500);
        assert!(merged.schema_unification.unwrap_array_root);
    }

    #[test]
    fn find_overrides_file_walks_up_to_git() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("nested");
        fs::create_dir_all(&sub_dir).unwrap();
        let overrides_path = dir.path().join(OVERRIDES_FILE_NAME);
        File::create(&overrides_path).unwrap();

        let found = find_overrides_file(&sub_dir);
        assert_eq!(found, Some(overrides_path));
    }

    #[test]
    fn find_overrides_file_stops_at_git_boundary() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        assert!(find_overrides_file(dir.path()).is_none());
    }

    #[test]
    fn load_overrides_defaults_when_absent() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let result = load_overrides(dir.path()).unwrap();
        assert!(!result.from_file);
        assert!(result.overrides.denied_properties.is_empty());
    }

    #[test]
    fn load_overrides_from_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(OVERRIDES_FILE_NAME),
            r#"{ "timeoutMs": 250 }"#,
        )
        .unwrap();
        let result = load_overrides(dir.path()).unwrap();
        assert!(result.from_file);
        assert_eq!(result.overrides.timeout_ms, Some(250));
    }
}
