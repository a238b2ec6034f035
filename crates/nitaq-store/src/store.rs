//! The run store trait and its in-memory implementation.

use std::collections::HashMap;

use nitaq_core::TenantId;
use nitaq_engine::{DerivationRun, RunStatus};
use parking_lot::RwLock;
use thiserror::Error;

/// A persistence failure.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backend could not durably record the run.
    #[error("failed to persist run: {0}")]
    Persistence(String),
}

/// Durable, append-only storage for derivation runs.
///
/// Implementations must never mutate or remove a previously persisted run;
/// the coordinator's atomicity guarantees build on that.
pub trait RunStore: Send + Sync {
    /// Append a run to the tenant's history.
    fn persist(&self, run: DerivationRun) -> Result<(), StoreError>;

    /// The most recent run of any status, if one exists.
    fn latest(&self, tenant: &TenantId) -> Option<DerivationRun>;

    /// The most recent completed run. This is what "the tenant's current
    /// scope" means; failed runs never shadow it.
    fn latest_completed(&self, tenant: &TenantId) -> Option<DerivationRun>;

    /// All runs for a tenant, oldest first.
    fn history(&self, tenant: &TenantId) -> Vec<DerivationRun>;
}

/// In-memory run store backed by a read-write lock.
///
/// The reference backend for tests, the CLI, and single-node deployments.
/// A SQL-backed store slots in behind the same trait.
#[derive(Debug, Default)]
pub struct InMemoryRunStore {
    runs: RwLock<HashMap<TenantId, Vec<DerivationRun>>>,
}

impl InMemoryRunStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RunStore for InMemoryRunStore {
    fn persist(&self, run: DerivationRun) -> Result<(), StoreError> {
        tracing::debug!(tenant = %run.tenant_id, run_id = %run.id, status = %run.status, "persisting run");
        self.runs
            .write()
            .entry(run.tenant_id)
            .or_default()
            .push(run);
        Ok(())
    }

    fn latest(&self, tenant: &TenantId) -> Option<DerivationRun> {
        self.runs
            .read()
            .get(tenant)
            .and_then(|runs| runs.last().cloned())
    }

    fn latest_completed(&self, tenant: &TenantId) -> Option<DerivationRun> {
        self.runs.read().get(tenant).and_then(|runs| {
            runs.iter()
                .rev()
                .find(|r| r.status == RunStatus::Completed)
                .cloned()
        })
    }

    fn history(&self, tenant: &TenantId) -> Vec<DerivationRun> {
        self.runs.read().get(tenant).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nitaq_core::{CatalogVersion, OrganizationProfile, RunId, Timestamp};

    fn run(tenant: TenantId, status: RunStatus) -> DerivationRun {
        DerivationRun {
            id: RunId::new(),
            tenant_id: tenant,
            catalog_version: CatalogVersion::new("v1").unwrap(),
            profile: OrganizationProfile::empty(tenant),
            status,
            created_at: Timestamp::now(),
            items: Vec::new(),
            failure: None,
        }
    }

    #[test]
    fn empty_store_has_nothing() {
        let store = InMemoryRunStore::new();
        let tenant = TenantId::new();
        assert!(store.latest(&tenant).is_none());
        assert!(store.latest_completed(&tenant).is_none());
        assert!(store.history(&tenant).is_empty());
    }

    #[test]
    fn history_is_append_only_and_ordered() {
        let store = InMemoryRunStore::new();
        let tenant = TenantId::new();
        let first = run(tenant, RunStatus::Completed);
        let second = run(tenant, RunStatus::Failed);
        store.persist(first.clone()).unwrap();
        store.persist(second.clone()).unwrap();

        let history = store.history(&tenant);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, first.id);
        assert_eq!(history[1].id, second.id);
    }

    #[test]
    fn failed_run_does_not_shadow_completed() {
        let store = InMemoryRunStore::new();
        let tenant = TenantId::new();
        let completed = run(tenant, RunStatus::Completed);
        let failed = run(tenant, RunStatus::Failed);
        store.persist(completed.clone()).unwrap();
        store.persist(failed.clone()).unwrap();

        assert_eq!(store.latest(&tenant).unwrap().id, failed.id);
        assert_eq!(store.latest_completed(&tenant).unwrap().id, completed.id);
    }

    #[test]
    fn tenants_are_isolated() {
        let store = InMemoryRunStore::new();
        let a = TenantId::new();
        let b = TenantId::new();
        store.persist(run(a, RunStatus::Completed)).unwrap();
        assert!(store.latest(&b).is_none());
        assert_eq!(store.history(&a).len(), 1);
    }
}
