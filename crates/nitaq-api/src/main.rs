//! # nitaq-api server entry point
//!
//! Loads catalog and rule content from files named by environment variables,
//! builds the application state, and serves the HTTP API.
//!
//! Configuration:
//! - `NITAQ_CATALOG` — path to the catalog content file (YAML or JSON)
//! - `NITAQ_RULES`   — path to the rules content file (YAML or JSON)
//! - `NITAQ_LISTEN`  — listen address, default `0.0.0.0:8080`

use std::path::Path;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use nitaq_api::state::AppState;
use nitaq_catalog::{CatalogFile, CatalogSnapshot};
use nitaq_rules::{RuleSet, RulesFile};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let catalog_path =
        std::env::var("NITAQ_CATALOG").context("NITAQ_CATALOG must name the catalog file")?;
    let rules_path =
        std::env::var("NITAQ_RULES").context("NITAQ_RULES must name the rules file")?;
    let listen = std::env::var("NITAQ_LISTEN").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let snapshot = load_catalog(Path::new(&catalog_path))?;
    let rules = load_rules(Path::new(&rules_path), &snapshot)?;
    tracing::info!(
        catalog_version = %snapshot.version(),
        items = snapshot.len(),
        rules = rules.len(),
        rejected_rules = rules.rejected().len(),
        "content loaded"
    );

    let app = nitaq_api::app(AppState::new(snapshot, rules));

    tracing::info!("nitaq-api listening on {listen}");
    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;

    Ok(())
}

fn load_catalog(path: &Path) -> anyhow::Result<CatalogSnapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog file {}", path.display()))?;
    let file: CatalogFile = parse_content(path, &text)
        .with_context(|| format!("failed to parse catalog file {}", path.display()))?;
    file.into_snapshot()
        .with_context(|| format!("invalid catalog in {}", path.display()))
}

fn load_rules(path: &Path, snapshot: &CatalogSnapshot) -> anyhow::Result<RuleSet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rules file {}", path.display()))?;
    let file: RulesFile = parse_content(path, &text)
        .with_context(|| format!("failed to parse rules file {}", path.display()))?;
    Ok(RuleSet::load(file.rules, snapshot))
}

/// Parse a content file as JSON or YAML based on its extension.
fn parse_content<T: serde::de::DeserializeOwned>(path: &Path, text: &str) -> anyhow::Result<T> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(text).map_err(Into::into),
        _ => serde_yaml::from_str(text).map_err(Into::into),
    }
}
