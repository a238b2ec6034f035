//! On-disk catalog content format.

use nitaq_core::CatalogVersion;
use serde::Deserialize;

use crate::error::CatalogError;
use crate::item::CatalogItem;
use crate::snapshot::CatalogSnapshot;

/// The shape of a catalog content file (JSON or YAML): a version label and
/// a flat item list. Validation happens when the file is turned into a
/// snapshot, not at parse time.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFile {
    /// The catalog version label.
    pub version: CatalogVersion,
    /// The catalog items, parents before or after children in any order.
    pub items: Vec<CatalogItem>,
}

impl CatalogFile {
    /// Validate the content and freeze it into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first structural [`CatalogError`] found.
    pub fn into_snapshot(self) -> Result<CatalogSnapshot, CatalogError> {
        CatalogSnapshot::new(self.version, self.items)
    }
}
