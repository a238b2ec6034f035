//! A single item of catalog content.

use nitaq_core::{CatalogItemId, CatalogItemType};
use serde::{Deserialize, Serialize};

/// One node of the catalog forest.
///
/// Items are plain data; all structural guarantees live in
/// [`CatalogSnapshot`](crate::CatalogSnapshot), which validates the set of
/// items as a whole at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique identifier within the catalog.
    pub id: CatalogItemId,

    /// The hierarchy level this item sits at.
    pub item_type: CatalogItemType,

    /// The parent item, absent only for regulators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CatalogItemId>,

    /// Stable human-facing code (e.g. "NCA-ECC", "SAMA-CSF-3.1.2").
    pub code: String,

    /// Display name.
    pub name: String,
}

impl CatalogItem {
    /// Convenience constructor for a root item (no parent).
    pub fn root(
        id: CatalogItemId,
        item_type: CatalogItemType,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            item_type,
            parent: None,
            code: code.into(),
            name: name.into(),
        }
    }

    /// Convenience constructor for a child item.
    pub fn child(
        id: CatalogItemId,
        item_type: CatalogItemType,
        parent: CatalogItemId,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            item_type,
            parent: Some(parent),
            code: code.into(),
            name: name.into(),
        }
    }
}
