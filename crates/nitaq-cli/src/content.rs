//! Content file loading shared by the subcommands.
//!
//! All three content kinds (catalog, rules, profile) are accepted as YAML
//! or JSON, dispatched on the file extension. Anything that is not `.json`
//! is parsed as YAML.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use nitaq_catalog::{CatalogFile, CatalogSnapshot};
use nitaq_core::OrganizationProfile;
use nitaq_rules::RulesFile;

/// Load and validate a catalog content file into a frozen snapshot.
pub fn load_catalog(path: &Path) -> Result<CatalogSnapshot> {
    let file: CatalogFile = load(path)?;
    file.into_snapshot()
        .with_context(|| format!("invalid catalog in {}", path.display()))
}

/// Load a rules content file. Rule-level validation happens when the file
/// is bound to a snapshot via `RuleSet::load`.
pub fn load_rules_file(path: &Path) -> Result<RulesFile> {
    load(path)
}

/// Load a profile file. The file carries the tenant id alongside the
/// attribute answers.
pub fn load_profile(path: &Path) -> Result<OrganizationProfile> {
    load(path)
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {} as JSON", path.display())),
        _ => serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse {} as YAML", path.display())),
    }
}
