//! Structural errors raised while constructing a catalog snapshot.
//!
//! Any of these makes the snapshot unusable as a whole. There is no
//! per-item skip path: a catalog that references missing parents or
//! mis-typed levels would let the resolver silently drop subtrees, so
//! construction fails loudly instead.

use nitaq_core::{CatalogItemId, CatalogItemType};
use thiserror::Error;

/// A structural inconsistency in catalog content.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Two items carry the same identifier.
    #[error("duplicate catalog item id: {id}")]
    DuplicateItem {
        /// The identifier that appeared more than once.
        id: CatalogItemId,
    },

    /// An item references a parent that is not in the snapshot.
    #[error("catalog item {item} references missing parent {parent}")]
    MissingParent {
        /// The item with the dangling reference.
        item: CatalogItemId,
        /// The referenced parent that does not exist.
        parent: CatalogItemId,
    },

    /// An item's parent exists but is of a type the hierarchy does not allow.
    #[error("catalog item {item} ({item_type}) cannot be parented by a {parent_type}")]
    ParentTypeMismatch {
        /// The child item.
        item: CatalogItemId,
        /// The child's type.
        item_type: CatalogItemType,
        /// The type of the referenced parent.
        parent_type: CatalogItemType,
    },

    /// A non-root item has no parent.
    #[error("catalog item {item} ({item_type}) must have a parent; only regulators are roots")]
    UnexpectedRoot {
        /// The orphaned item.
        item: CatalogItemId,
        /// The item's type.
        item_type: CatalogItemType,
    },

    /// Following parent references from an item revisits it.
    #[error("catalog parent chain starting at {item} forms a cycle")]
    CycleDetected {
        /// An item on the cycle.
        item: CatalogItemId,
    },
}
