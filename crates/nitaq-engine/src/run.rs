//! Derivation run records and the consumer-facing derived scope.

use nitaq_core::{
    sha256_digest, CanonicalBytes, CanonicalizationError, CatalogItemId, CatalogItemType,
    CatalogVersion, ContentDigest, OrganizationProfile, RuleId, RunId, TenantId, Timestamp,
};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a derivation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Derivation is in flight; the record is not yet visible to consumers.
    Pending,
    /// Derivation finished and the item list is authoritative.
    Completed,
    /// Derivation aborted; the item list is empty and the previous
    /// completed run remains the tenant's scope.
    Failed,
}

impl RunStatus {
    /// The snake_case identifier string, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The verdict for one catalog item in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedScopeItem {
    /// The catalog item this verdict is about.
    pub item_id: CatalogItemId,
    /// The item's hierarchy level, denormalized for consumers.
    pub item_type: CatalogItemType,
    /// The item's stable code, denormalized for display and reason text.
    pub code: String,
    /// Whether the item is in the tenant's scope.
    pub included: bool,
    /// Natural-language fragments explaining the verdict.
    pub reasons: Vec<String>,
    /// Rules whose conditions were satisfied for this item, sorted.
    pub matched_rule_ids: Vec<RuleId>,
}

/// The durable record of one derivation.
///
/// Everything a reviewer needs to audit the outcome travels with the run:
/// the exact profile snapshot evaluated, the catalog version, and the full
/// per-item verdict list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationRun {
    /// Unique run identifier.
    pub id: RunId,
    /// The tenant derived for.
    pub tenant_id: TenantId,
    /// The catalog version evaluated.
    pub catalog_version: CatalogVersion,
    /// The frozen profile the run evaluated.
    pub profile: OrganizationProfile,
    /// Run lifecycle state.
    pub status: RunStatus,
    /// When the run was recorded.
    pub created_at: Timestamp,
    /// One verdict per catalog item, in catalog order. Empty for failed runs.
    pub items: Vec<DerivedScopeItem>,
    /// Failure detail for failed runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Fingerprint payload: the result fields only, so two runs of the same
/// inputs compare equal regardless of run id and wall clock.
#[derive(Serialize)]
struct FingerprintView<'a> {
    catalog_version: &'a CatalogVersion,
    items: &'a [DerivedScopeItem],
}

impl DerivationRun {
    /// Record a failed run. The item list is empty by construction so a
    /// failed run can never be mistaken for an authoritative scope.
    pub fn failed(
        tenant_id: TenantId,
        catalog_version: CatalogVersion,
        profile: OrganizationProfile,
        failure: impl Into<String>,
    ) -> Self {
        Self {
            id: RunId::new(),
            tenant_id,
            catalog_version,
            profile,
            status: RunStatus::Failed,
            created_at: Timestamp::now(),
            items: Vec::new(),
            failure: Some(failure.into()),
        }
    }

    /// Content digest of the run's result (catalog version and verdicts,
    /// excluding run id and timestamp). Two runs over identical inputs
    /// produce identical fingerprints; that equality is the idempotence
    /// contract consumers can check.
    ///
    /// # Errors
    ///
    /// Returns a canonicalization error if serialization fails; run records
    /// contain no floats, so this does not happen for well-formed runs.
    pub fn fingerprint(&self) -> Result<ContentDigest, CanonicalizationError> {
        let view = FingerprintView {
            catalog_version: &self.catalog_version,
            items: &self.items,
        };
        let cb = CanonicalBytes::new(&view)?;
        Ok(sha256_digest(&cb))
    }

    /// The verdicts marked included, in catalog order.
    pub fn included_items(&self) -> impl Iterator<Item = &DerivedScopeItem> {
        self.items.iter().filter(|i| i.included)
    }
}

/// The consumer-facing view of a tenant's current scope: the latest
/// completed run, stripped of engine bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedScope {
    /// The catalog version the scope was derived against.
    pub catalog_version: CatalogVersion,
    /// When the underlying run was recorded.
    pub derived_at: Timestamp,
    /// One verdict per catalog item, in catalog order.
    pub items: Vec<DerivedScopeItem>,
}

impl DerivedScope {
    /// Build the consumer view from a run. Returns `None` unless the run
    /// completed; pending and failed runs are never a scope.
    pub fn from_run(run: &DerivationRun) -> Option<Self> {
        if run.status != RunStatus::Completed {
            return None;
        }
        Some(Self {
            catalog_version: run.catalog_version.clone(),
            derived_at: run.created_at,
            items: run.items.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(code: &str, included: bool) -> DerivedScopeItem {
        DerivedScopeItem {
            item_id: CatalogItemId::new(),
            item_type: CatalogItemType::Framework,
            code: code.to_string(),
            included,
            reasons: vec![format!("{code} verdict")],
            matched_rule_ids: Vec::new(),
        }
    }

    fn completed_run(items: Vec<DerivedScopeItem>) -> DerivationRun {
        let tenant = TenantId::new();
        DerivationRun {
            id: RunId::new(),
            tenant_id: tenant,
            catalog_version: CatalogVersion::new("v1").unwrap(),
            profile: OrganizationProfile::empty(tenant),
            status: RunStatus::Completed,
            created_at: Timestamp::now(),
            items,
            failure: None,
        }
    }

    #[test]
    fn fingerprint_ignores_run_id_and_time() {
        let items = vec![item("A", true), item("B", false)];
        let mut a = completed_run(items.clone());
        let mut b = completed_run(items);
        a.created_at = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        b.created_at = Timestamp::parse("2026-06-01T00:00:00Z").unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn fingerprint_changes_with_verdicts() {
        let shared = item("A", true);
        let a = completed_run(vec![shared.clone()]);
        let mut flipped = shared;
        flipped.included = false;
        let b = completed_run(vec![flipped]);
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn failed_run_has_no_items() {
        let tenant = TenantId::new();
        let run = DerivationRun::failed(
            tenant,
            CatalogVersion::new("v1").unwrap(),
            OrganizationProfile::empty(tenant),
            "catalog inconsistency",
        );
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.items.is_empty());
        assert_eq!(run.failure.as_deref(), Some("catalog inconsistency"));
    }

    #[test]
    fn derived_scope_only_from_completed() {
        let run = completed_run(vec![item("A", true)]);
        let scope = DerivedScope::from_run(&run).unwrap();
        assert_eq!(scope.items.len(), 1);

        let mut failed = run.clone();
        failed.status = RunStatus::Failed;
        assert!(DerivedScope::from_run(&failed).is_none());

        let mut pending = run;
        pending.status = RunStatus::Pending;
        assert!(DerivedScope::from_run(&pending).is_none());
    }

    #[test]
    fn included_items_filters() {
        let run = completed_run(vec![item("A", true), item("B", false), item("C", true)]);
        let codes: Vec<&str> = run.included_items().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "C"]);
    }

    #[test]
    fn run_serde_roundtrip() {
        let run = completed_run(vec![item("A", true)]);
        let json = serde_json::to_string(&run).unwrap();
        let back: DerivationRun = serde_json::from_str(&json).unwrap();
        assert_eq!(run, back);
    }
}
