//! The validated, immutable catalog snapshot.

use std::collections::{HashMap, HashSet};

use nitaq_core::{CatalogItemId, CatalogVersion};
use serde::Serialize;

use crate::error::CatalogError;
use crate::item::CatalogItem;

/// A versioned, structurally validated catalog forest.
///
/// Construction via [`CatalogSnapshot::new()`] is the only path, and it
/// checks every invariant the resolver relies on:
///
/// - item identifiers are unique,
/// - every referenced parent exists,
/// - parent types follow [`CatalogItemType::allowed_parents()`](nitaq_core::CatalogItemType::allowed_parents),
/// - only regulators are roots,
/// - parent chains are acyclic.
///
/// Iteration order is the insertion order of the item list, which keeps
/// derived scope output deterministic for a given catalog file.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    version: CatalogVersion,
    items: Vec<CatalogItem>,
    #[serde(skip)]
    index: HashMap<CatalogItemId, usize>,
    #[serde(skip)]
    children: HashMap<CatalogItemId, Vec<CatalogItemId>>,
}

impl CatalogSnapshot {
    /// Validate a set of items and freeze them into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first [`CatalogError`] found. Catalog content is
    /// authored centrally; a structural error means the content pipeline
    /// produced a bad artifact and nothing downstream should run.
    pub fn new(
        version: CatalogVersion,
        items: Vec<CatalogItem>,
    ) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            if index.insert(item.id, pos).is_some() {
                return Err(CatalogError::DuplicateItem { id: item.id });
            }
        }

        let mut children: HashMap<CatalogItemId, Vec<CatalogItemId>> = HashMap::new();
        for item in &items {
            match item.parent {
                None => {
                    if !item.item_type.is_root() {
                        return Err(CatalogError::UnexpectedRoot {
                            item: item.id,
                            item_type: item.item_type,
                        });
                    }
                }
                Some(parent_id) => {
                    let parent_pos = index.get(&parent_id).copied().ok_or(
                        CatalogError::MissingParent {
                            item: item.id,
                            parent: parent_id,
                        },
                    )?;
                    let parent_type = items[parent_pos].item_type;
                    if !item.item_type.allowed_parents().contains(&parent_type) {
                        return Err(CatalogError::ParentTypeMismatch {
                            item: item.id,
                            item_type: item.item_type,
                            parent_type,
                        });
                    }
                    children.entry(parent_id).or_default().push(item.id);
                }
            }
        }

        // The typed-parent check already forces parent levels to be strictly
        // shallower, but the walk stays as a backstop should same-level
        // parenting ever be allowed.
        for item in &items {
            let mut seen = HashSet::new();
            let mut cursor = item;
            while let Some(parent_id) = cursor.parent {
                if !seen.insert(cursor.id) {
                    return Err(CatalogError::CycleDetected { item: item.id });
                }
                match index.get(&parent_id).map(|pos| &items[*pos]) {
                    Some(parent) => cursor = parent,
                    None => break, // already rejected above
                }
            }
        }

        Ok(Self {
            version,
            items,
            index,
            children,
        })
    }

    /// The catalog version this snapshot was built from.
    pub fn version(&self) -> &CatalogVersion {
        &self.version
    }

    /// Look up an item by id.
    pub fn get(&self, id: &CatalogItemId) -> Option<&CatalogItem> {
        self.index.get(id).map(|pos| &self.items[*pos])
    }

    /// True if the snapshot contains an item with this id.
    pub fn contains(&self, id: &CatalogItemId) -> bool {
        self.index.contains_key(id)
    }

    /// The direct children of an item, in catalog order.
    pub fn children_of(&self, id: &CatalogItemId) -> &[CatalogItemId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All items, in catalog order.
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Number of items in the snapshot.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the snapshot holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item ids grouped by hierarchy level, deepest level first.
    ///
    /// The resolver processes one group at a time so that every child's
    /// verdict exists before its parent's is finalized. Within a group,
    /// catalog order is preserved.
    pub fn levels_deepest_first(&self) -> Vec<Vec<CatalogItemId>> {
        let mut by_level: Vec<Vec<CatalogItemId>> = vec![Vec::new(); 5];
        for item in &self.items {
            by_level[item.item_type.level() as usize].push(item.id);
        }
        by_level.reverse();
        by_level.retain(|group| !group.is_empty());
        by_level
    }
}
