//! # nitaq-core — Foundational Types for the Scope Derivation Engine
//!
//! This crate is the bedrock of the Nitaq engine. It defines the core
//! type-system primitives that enforce correctness guarantees at compile time.
//! Every other crate in the workspace depends on `nitaq-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `TenantId`, `CatalogItemId`,
//!    `RuleId`, `RunId`, `CatalogVersion` — all newtypes with validated
//!    constructors. No bare strings for identifiers.
//!
//! 2. **`CanonicalBytes` newtype.** ALL digest computation flows through
//!    `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for digests.
//!    This is what makes run fingerprints byte-comparable across processes.
//!
//! 3. **Single `CatalogItemType` enum.** One definition, 7 variants, exhaustive
//!    `match` everywhere. Adding a catalog level forces every consumer to
//!    handle it.
//!
//! 4. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z suffix
//!    and seconds precision, keeping run records canonically comparable.
//!
//! 5. **Immutable profile snapshots.** `OrganizationProfile` has no mutators;
//!    a derivation run sees exactly one frozen view of tenant answers.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `nitaq-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod itemtype;
pub mod profile;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, CoreError, ValidationError};
pub use identity::{CatalogItemId, CatalogVersion, RuleId, RunId, TenantId};
pub use itemtype::{CatalogItemType, CATALOG_ITEM_TYPE_COUNT};
pub use profile::{AttributeRef, OrganizationProfile};
pub use temporal::Timestamp;
