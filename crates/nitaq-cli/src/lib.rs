//! # nitaq-cli — CLI Tool for the Nitaq Engine
//!
//! Provides the `nitaq` command-line interface for operators working with
//! catalog and rule content files outside the API service.
//!
//! ## Subcommands
//!
//! - `nitaq derive` — Run one derivation from profile, catalog, and rules
//!   files and print the recorded run.
//! - `nitaq validate` — Structural validation of catalog and rules files.
//!
//! ```bash
//! nitaq validate --catalog catalog.yaml --rules rules.yaml
//! nitaq derive --profile profile.yaml --catalog catalog.yaml --rules rules.yaml
//! ```

pub mod content;
pub mod derive;
pub mod validate;
