//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the Nitaq engine.
//! Each identifier is a distinct type — you cannot pass a [`TenantId`]
//! where a [`RuleId`] is expected.
//!
//! ## Validation
//!
//! The string-based [`CatalogVersion`] validates format at construction
//! time. UUID-based identifiers ([`TenantId`], [`CatalogItemId`], [`RuleId`],
//! [`RunId`]) are always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Helper macro for UUID-based identifier newtypes: constructor, accessors,
/// `Default`, `From<Uuid>`, `Display`, and `FromStr`.
macro_rules! impl_uuid_id {
    ($ty:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s).map(Self)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// UUID-based identifiers (always valid by construction)
// ---------------------------------------------------------------------------

impl_uuid_id!(
    TenantId,
    "A unique identifier for a tenant organization whose compliance scope is derived."
);

impl_uuid_id!(
    CatalogItemId,
    "A unique identifier for an item in the compliance catalog (regulator, framework, control, ...)."
);

impl_uuid_id!(RuleId, "A unique identifier for an applicability rule.");

impl_uuid_id!(RunId, "A unique identifier for a single derivation run.");

// ---------------------------------------------------------------------------
// String-based identifiers (validated at construction)
// ---------------------------------------------------------------------------

/// A catalog version label, e.g. `"2026.2"` or `"ksa-catalog-v14"`.
///
/// Rules bind to a catalog version; the resolver refuses to mix a ruleset
/// with a snapshot of a different version. The label itself is opaque —
/// equality is the only comparison the engine performs.
///
/// # Validation
///
/// - Must be non-empty after trimming.
/// - Must be printable ASCII (no control characters, no whitespace padding
///   that would make two labels compare unequal by accident).
/// - At most 64 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CatalogVersion(String);

impl_validating_deserialize!(CatalogVersion);

impl CatalogVersion {
    /// Create a catalog version label, validating format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCatalogVersion`] if the label is
    /// empty, longer than 64 characters, or contains non-printable or
    /// whitespace characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty()
            || s.len() > 64
            || !s.chars().all(|c| c.is_ascii_graphic())
        {
            return Err(ValidationError::InvalidCatalogVersion(s));
        }
        Ok(Self(s))
    }

    /// Access the version label.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CatalogVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
