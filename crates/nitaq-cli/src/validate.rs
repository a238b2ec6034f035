//! # Validate Subcommand
//!
//! Structural validation of content files without running a derivation:
//! catalog hierarchy checks, and optionally rule checks against that
//! catalog.
//!
//! ## Commands
//!
//! - `nitaq validate --catalog c.yaml` — Validate the catalog structure.
//! - `nitaq validate --catalog c.yaml --rules r.yaml` — Also bind the
//!   rules and report rejections.
//!
//! Exit code 0 when everything is valid, 1 when any rule is rejected.
//! Catalog errors fail the command outright.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::content;

/// Arguments for the `nitaq validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the catalog content file (YAML or JSON).
    #[arg(long)]
    pub catalog: PathBuf,

    /// Optional path to a rules content file to bind against the catalog.
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let snapshot = content::load_catalog(&args.catalog)?;
    println!(
        "catalog {}: {} items, valid",
        snapshot.version(),
        snapshot.len()
    );

    let Some(rules_path) = &args.rules else {
        return Ok(0);
    };

    let rules_file = content::load_rules_file(rules_path)?;
    let total = rules_file.rules.len();
    let set = nitaq_rules::RuleSet::load(rules_file.rules, &snapshot);
    println!(
        "rules: {} of {total} accepted, {} rejected",
        set.len(),
        set.rejected().len()
    );

    for rejected in set.rejected() {
        println!("  rejected {}: {}", rejected.rule_id, rejected.reason);
    }

    if set.rejected().is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}
