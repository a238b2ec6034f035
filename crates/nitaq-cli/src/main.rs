//! # nitaq CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros; verbosity maps to a tracing `EnvFilter`.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nitaq_cli::derive::{run_derive, DeriveArgs};
use nitaq_cli::validate::{run_validate, ValidateArgs};

/// Nitaq — compliance scope derivation toolchain.
///
/// File-driven derivation and content validation for operators working
/// outside the API service.
#[derive(Parser, Debug)]
#[command(name = "nitaq", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one derivation from profile, catalog, and rules files.
    Derive(DeriveArgs),

    /// Validate catalog and rules content files.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Derive(args) => run_derive(&args),
        Commands::Validate(args) => run_validate(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn cli_parse_derive() {
        let cli = Cli::try_parse_from([
            "nitaq",
            "derive",
            "--profile",
            "profile.yaml",
            "--catalog",
            "catalog.yaml",
            "--rules",
            "rules.yaml",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Derive(_)));
        if let Commands::Derive(args) = cli.command {
            assert_eq!(args.profile, PathBuf::from("profile.yaml"));
            assert!(args.out.is_none());
            assert!(!args.included_only);
        }
    }

    #[test]
    fn cli_parse_derive_with_options() {
        let cli = Cli::try_parse_from([
            "nitaq",
            "derive",
            "--profile",
            "p.json",
            "--catalog",
            "c.json",
            "--rules",
            "r.json",
            "--out",
            "run.json",
            "--included-only",
        ])
        .unwrap();
        if let Commands::Derive(args) = cli.command {
            assert_eq!(args.out, Some(PathBuf::from("run.json")));
            assert!(args.included_only);
        }
    }

    #[test]
    fn cli_parse_validate_catalog_only() {
        let cli = Cli::try_parse_from(["nitaq", "validate", "--catalog", "catalog.yaml"]).unwrap();
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.catalog, PathBuf::from("catalog.yaml"));
            assert!(args.rules.is_none());
        }
    }

    #[test]
    fn cli_parse_validate_with_rules() {
        let cli = Cli::try_parse_from([
            "nitaq",
            "validate",
            "--catalog",
            "catalog.yaml",
            "--rules",
            "rules.yaml",
        ])
        .unwrap();
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.rules, Some(PathBuf::from("rules.yaml")));
        }
    }

    #[test]
    fn cli_parse_verbose_levels() {
        let cli = Cli::try_parse_from(["nitaq", "-vv", "validate", "--catalog", "c.yaml"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["nitaq"]).is_err());
    }

    #[test]
    fn cli_parse_derive_missing_required_errors() {
        assert!(Cli::try_parse_from(["nitaq", "derive", "--profile", "p.yaml"]).is_err());
    }
}
