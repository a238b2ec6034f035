//! # nitaq-engine — Scope Derivation
//!
//! Turns a frozen [`OrganizationProfile`](nitaq_core::OrganizationProfile),
//! a validated [`CatalogSnapshot`](nitaq_catalog::CatalogSnapshot), and a
//! loaded [`RuleSet`](nitaq_rules::RuleSet) into a
//! [`DerivationRun`](run::DerivationRun): one verdict per catalog item with
//! a natural-language reason trace.
//!
//! ## Guarantees
//!
//! - **Pure and total evaluation.** [`evaluate()`](evaluator::evaluate)
//!   never fails; missing profile answers make conditions unsatisfied.
//! - **Deny overrides.** One satisfied exclude rule beats any number of
//!   includes for the same item, and beats inclusion arriving transitively
//!   from children.
//! - **Children before parents.** Verdicts are aggregated deepest level
//!   first, so a parent's transitive inclusion is decided against final
//!   child verdicts.
//! - **Determinism.** The same profile, catalog, and rules always produce
//!   the same item list, byte for byte under canonical serialization —
//!   that is what [`DerivationRun::fingerprint()`](run::DerivationRun::fingerprint)
//!   measures.

pub mod evaluator;
pub mod resolver;
pub mod run;

pub use evaluator::{evaluate, Evaluation};
pub use resolver::{derive, DeriveConfig, DeriveError};
pub use run::{DerivationRun, DerivedScope, DerivedScopeItem, RunStatus};
