//! # Derive Subcommand
//!
//! One-shot derivation from content files: loads a profile, a catalog, and
//! a rule set, runs the engine, and prints the recorded run as JSON.
//!
//! ## Commands
//!
//! - `nitaq derive --profile p.yaml --catalog c.yaml --rules r.yaml` —
//!   Derive and print the full run to stdout (or `--out <file>`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use nitaq_store::{DerivationCoordinator, InMemoryRunStore};

use crate::content;

/// Arguments for the `nitaq derive` subcommand.
#[derive(Args, Debug)]
pub struct DeriveArgs {
    /// Path to the organization profile file (YAML or JSON).
    #[arg(long)]
    pub profile: PathBuf,

    /// Path to the catalog content file (YAML or JSON).
    #[arg(long)]
    pub catalog: PathBuf,

    /// Path to the rules content file (YAML or JSON).
    #[arg(long)]
    pub rules: PathBuf,

    /// Write the run JSON to a file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Print only included items instead of the full run.
    #[arg(long)]
    pub included_only: bool,
}

/// Execute the derive subcommand.
pub fn run_derive(args: &DeriveArgs) -> Result<u8> {
    let snapshot = content::load_catalog(&args.catalog)?;
    let rules_file = content::load_rules_file(&args.rules)?;
    let rules = nitaq_rules::RuleSet::load(rules_file.rules, &snapshot);
    let profile = content::load_profile(&args.profile)?;

    tracing::info!(
        catalog_version = %snapshot.version(),
        items = snapshot.len(),
        rules = rules.len(),
        rejected_rules = rules.rejected().len(),
        tenant = %profile.tenant_id,
        "running derivation"
    );

    let coordinator = DerivationCoordinator::new(InMemoryRunStore::new());
    let run = coordinator
        .derive_and_record(&profile, &snapshot, &rules)
        .context("derivation failed")?;

    let fingerprint = run.fingerprint().context("fingerprint failed")?;
    eprintln!(
        "run {} completed: {} of {} items in scope ({fingerprint})",
        run.id,
        run.included_items().count(),
        run.items.len(),
    );

    let json = if args.included_only {
        let included: Vec<_> = run.included_items().collect();
        serde_json::to_string_pretty(&included)?
    } else {
        serde_json::to_string_pretty(&run)?
    };

    match &args.out {
        Some(path) => write_output(path, &json)?,
        None => println!("{json}"),
    }

    Ok(0)
}

fn write_output(path: &Path, json: &str) -> Result<()> {
    std::fs::write(path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
