//! # Catalog Item Taxonomy
//!
//! Defines [`CatalogItemType`], the single enumeration of catalog levels
//! recognized by the scope derivation engine. This is the ONE place the
//! taxonomy is defined — every other crate matches exhaustively on this
//! enum, so adding a level forces every consumer to handle it.
//!
//! ## Hierarchy
//!
//! ```text
//! Regulator
//!   └── Framework
//!         ├── Baseline ──┐
//!         ├── Package  ──┤
//!         │              └── Control
//!         └── Control          ├── Template
//!                              └── EvidenceType
//! ```
//!
//! A Framework may parent Controls directly or group them under a Baseline
//! or Package. Templates and EvidenceTypes always hang off a Control.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The number of catalog item types. Kept in sync with [`CatalogItemType::all()`]
/// by an exhaustive-match test.
pub const CATALOG_ITEM_TYPE_COUNT: usize = 7;

/// The level of an item in the compliance catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogItemType {
    /// A regulatory authority (e.g. a central bank or data protection office).
    Regulator,
    /// A framework published by a regulator (a body of requirements).
    Framework,
    /// A named subset of a framework's controls scoped to a risk tier.
    Baseline,
    /// A thematic grouping of controls within a framework.
    Package,
    /// An individual requirement an organization implements and attests to.
    Control,
    /// A document template attached to a control.
    Template,
    /// A kind of evidence artifact a control accepts.
    EvidenceType,
}

impl CatalogItemType {
    /// All catalog item types, in hierarchy order.
    pub fn all() -> [CatalogItemType; CATALOG_ITEM_TYPE_COUNT] {
        [
            Self::Regulator,
            Self::Framework,
            Self::Baseline,
            Self::Package,
            Self::Control,
            Self::Template,
            Self::EvidenceType,
        ]
    }

    /// The snake_case identifier string, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regulator => "regulator",
            Self::Framework => "framework",
            Self::Baseline => "baseline",
            Self::Package => "package",
            Self::Control => "control",
            Self::Template => "template",
            Self::EvidenceType => "evidence_type",
        }
    }

    /// Structural depth of this type in the catalog forest. Regulators are
    /// roots at level 0; Templates and EvidenceTypes are the deepest leaves.
    pub fn level(&self) -> u8 {
        match self {
            Self::Regulator => 0,
            Self::Framework => 1,
            Self::Baseline | Self::Package => 2,
            Self::Control => 3,
            Self::Template | Self::EvidenceType => 4,
        }
    }

    /// The item types permitted as a parent of this type. Empty for roots.
    ///
    /// Controls may be parented by a Framework directly or grouped under a
    /// Baseline or Package.
    pub fn allowed_parents(&self) -> &'static [CatalogItemType] {
        match self {
            Self::Regulator => &[],
            Self::Framework => &[Self::Regulator],
            Self::Baseline | Self::Package => &[Self::Framework],
            Self::Control => &[Self::Framework, Self::Baseline, Self::Package],
            Self::Template | Self::EvidenceType => &[Self::Control],
        }
    }

    /// True if items of this type may be roots of the catalog forest.
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Regulator)
    }
}

impl std::fmt::Display for CatalogItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CatalogItemType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regulator" => Ok(Self::Regulator),
            "framework" => Ok(Self::Framework),
            "baseline" => Ok(Self::Baseline),
            "package" => Ok(Self::Package),
            "control" => Ok(Self::Control),
            "template" => Ok(Self::Template),
            "evidence_type" => Ok(Self::EvidenceType),
            other => Err(ValidationError::UnknownItemType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn all_returns_every_variant_once() {
        let all = CatalogItemType::all();
        assert_eq!(all.len(), CATALOG_ITEM_TYPE_COUNT);
        let unique: std::collections::HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), CATALOG_ITEM_TYPE_COUNT);
    }

    #[test]
    fn as_str_from_str_roundtrip() {
        for ty in CatalogItemType::all() {
            let parsed = CatalogItemType::from_str(ty.as_str()).unwrap();
            assert_eq!(parsed, ty);
        }
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!(CatalogItemType::from_str("standard").is_err());
        assert!(CatalogItemType::from_str("").is_err());
        assert!(CatalogItemType::from_str("Regulator").is_err()); // case-sensitive
    }

    #[test]
    fn serde_matches_as_str() {
        for ty in CatalogItemType::all() {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
        }
    }

    #[test]
    fn only_regulator_is_root() {
        for ty in CatalogItemType::all() {
            assert_eq!(ty.is_root(), ty == CatalogItemType::Regulator);
            assert_eq!(ty.is_root(), ty.allowed_parents().is_empty());
        }
    }

    #[test]
    fn allowed_parents_are_strictly_shallower() {
        for ty in CatalogItemType::all() {
            for parent in ty.allowed_parents() {
                assert!(
                    parent.level() < ty.level(),
                    "{parent} must be shallower than {ty}"
                );
            }
        }
    }

    #[test]
    fn levels_span_zero_to_four() {
        let levels: std::collections::BTreeSet<_> =
            CatalogItemType::all().iter().map(|t| t.level()).collect();
        assert_eq!(levels, (0..=4).collect());
    }

    #[test]
    fn control_accepts_three_parent_types() {
        let parents = CatalogItemType::Control.allowed_parents();
        assert_eq!(parents.len(), 3);
        assert!(parents.contains(&CatalogItemType::Framework));
        assert!(parents.contains(&CatalogItemType::Baseline));
        assert!(parents.contains(&CatalogItemType::Package));
    }
}
