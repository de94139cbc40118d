//! The plugins.json manifest
//!
//! One entry per plugin, matched to local archives by case-insensitive name.
//! Empty optionals are omitted on write (serialization policy only; internal
//! decision logic always sees the typed options).

use std::path::Path;

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::resolve::info::SourceKind;

pub const MANIFEST_FILE: &str = "plugins.json";
pub const SCHEMA_URL: &str = "https://github.com/shifterest/jarwatch/raw/main/schema.json";

/// One manifest entry. All source identifiers are optional; a source is only
/// queried when its identifier is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginEntry {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spigot_id: Option<u64>,
    #[serde(skip_serializing_if = "empty_string")]
    pub bukkit_slug: Option<String>,
    /// `owner/repo`.
    #[serde(skip_serializing_if = "empty_string")]
    pub github_repo: Option<String>,
    /// `host[/path]`, scheme optional.
    #[serde(skip_serializing_if = "empty_string")]
    pub jenkins_server: Option<String>,

    #[serde(skip_serializing_if = "empty_string")]
    pub github_reg_ex: Option<String>,
    #[serde(skip_serializing_if = "empty_string")]
    pub github_reg_ex_inverse: Option<String>,
    #[serde(skip_serializing_if = "empty_string")]
    pub jenkins_reg_ex: Option<String>,
    #[serde(skip_serializing_if = "empty_string")]
    pub jenkins_reg_ex_inverse: Option<String>,

    #[serde(skip_serializing_if = "empty_string")]
    pub stable_direct_url: Option<String>,
    #[serde(skip_serializing_if = "empty_string")]
    pub experimental_direct_url: Option<String>,

    /// Overrides every computed filename.
    #[serde(skip_serializing_if = "empty_string")]
    pub filename: Option<String>,

    /// Per-plugin precedence override, consulted before the computed order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_precedence: Vec<SourceKind>,
    /// Use `custom_precedence` verbatim instead of prepending it.
    #[serde(skip_serializing_if = "is_false")]
    pub custom_precedence_only: bool,
}

fn empty_string(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl PluginEntry {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Compiled GitHub asset filters.
    pub fn github_filters(&self) -> Result<(Option<Regex>, Option<Regex>), regex::Error> {
        Ok((
            compile(&self.github_reg_ex)?,
            compile(&self.github_reg_ex_inverse)?,
        ))
    }

    /// Compiled Jenkins artifact filters.
    pub fn jenkins_filters(&self) -> Result<(Option<Regex>, Option<Regex>), regex::Error> {
        Ok((
            compile(&self.jenkins_reg_ex)?,
            compile(&self.jenkins_reg_ex_inverse)?,
        ))
    }
}

fn compile(pattern: &Option<String>) -> Result<Option<Regex>, regex::Error> {
    pattern
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(Regex::new)
        .transpose()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "$schema", default = "default_schema")]
    pub schema: String,
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
}

fn default_schema() -> String {
    SCHEMA_URL.to_string()
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            plugins: Vec::new(),
        }
    }
}

impl Manifest {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Case-insensitive entry lookup.
    pub fn find(&self, name: &str) -> Option<&PluginEntry> {
        self.plugins
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Appends bare entries for every archive name not yet listed. Returns
    /// how many entries were added.
    pub fn add_missing(&mut self, archive_names: &[String]) -> usize {
        let mut added = 0;
        for name in archive_names {
            if self.find(name).is_none() {
                self.plugins.push(PluginEntry::named(name));
                added += 1;
            }
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_entry() {
        let manifest: Manifest = serde_json::from_value(json!({
            "$schema": SCHEMA_URL,
            "plugins": [{
                "name": "EssentialsX",
                "spigotId": 9089,
                "githubRepo": "EssentialsX/Essentials",
                "githubRegEx": "^EssentialsX-",
                "githubRegExInverse": "(AntiBuild|Chat)",
                "customPrecedence": ["github", "spigot"],
                "customPrecedenceOnly": true
            }]
        }))
        .unwrap();

        let entry = &manifest.plugins[0];
        assert_eq!(entry.name, "EssentialsX");
        assert_eq!(entry.spigot_id, Some(9089));
        assert_eq!(entry.github_repo.as_deref(), Some("EssentialsX/Essentials"));
        assert_eq!(
            entry.custom_precedence,
            vec![SourceKind::Github, SourceKind::Spigot]
        );
        assert!(entry.custom_precedence_only);
    }

    #[test]
    fn empty_fields_are_omitted_on_write() {
        let mut entry = PluginEntry::named("Example");
        entry.bukkit_slug = Some(String::new());

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value, json!({ "name": "Example" }));
    }

    #[test]
    fn find_is_case_insensitive() {
        let manifest = Manifest {
            plugins: vec![PluginEntry::named("WorldEdit")],
            ..Manifest::default()
        };

        assert!(manifest.find("worldedit").is_some());
        assert!(manifest.find("WORLDEDIT").is_some());
        assert!(manifest.find("worldguard").is_none());
    }

    #[test]
    fn add_missing_skips_existing_entries() {
        let mut manifest = Manifest {
            plugins: vec![PluginEntry::named("WorldEdit")],
            ..Manifest::default()
        };

        let added = manifest.add_missing(&[
            "worldedit".to_string(),
            "Vault".to_string(),
        ]);

        assert_eq!(added, 1);
        assert_eq!(manifest.plugins.len(), 2);
        assert_eq!(manifest.plugins[1].name, "Vault");
    }

    #[test]
    fn invalid_filter_pattern_is_an_error() {
        let mut entry = PluginEntry::named("Example");
        entry.github_reg_ex = Some("[".to_string());

        assert!(entry.github_filters().is_err());
    }
}
