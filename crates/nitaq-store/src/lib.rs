//! # nitaq-store — Derivation Run Recording
//!
//! Persists [`DerivationRun`](nitaq_engine::DerivationRun) records and
//! serializes derivations per tenant.
//!
//! ## Contracts
//!
//! - The store is **append-only**: a new run never rewrites an old record,
//!   so a failed run can never damage the last completed scope.
//! - "Current scope" is always *latest completed run*, never latest run.
//! - The [`DerivationCoordinator`] admits at most one in-flight derivation
//!   per tenant; a second request while one runs is refused with a
//!   recoverable conflict error, not queued.

pub mod coordinator;
pub mod store;

pub use coordinator::{CoordinatorError, DerivationCoordinator};
pub use store::{InMemoryRunStore, RunStore, StoreError};
