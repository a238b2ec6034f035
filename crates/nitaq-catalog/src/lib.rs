//! # nitaq-catalog — Validated Compliance Catalog Snapshots
//!
//! A catalog snapshot is the versioned, immutable forest of compliance
//! content the engine derives scope over: regulators at the roots,
//! frameworks under them, then baselines/packages, controls, and finally
//! templates and evidence types.
//!
//! ## Invariant
//!
//! A [`CatalogSnapshot`] can only be constructed through
//! [`CatalogSnapshot::new()`], which validates the whole forest: unique
//! identifiers, existing parents, hierarchy-typed parent references, typed
//! roots, and no cycles. Downstream code (the resolver in particular) can
//! therefore walk parents and levels without re-checking structure.

pub mod error;
pub mod file;
pub mod item;
pub mod snapshot;

pub use error::CatalogError;
pub use file::CatalogFile;
pub use item::CatalogItem;
pub use snapshot::CatalogSnapshot;
