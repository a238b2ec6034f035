//! The derivation coordinator: one derivation per tenant at a time, with
//! the outcome recorded whatever happens.

use std::collections::HashSet;

use nitaq_catalog::CatalogSnapshot;
use nitaq_core::{OrganizationProfile, RunId, TenantId};
use nitaq_engine::{derive, DerivationRun, DeriveConfig, DeriveError};
use nitaq_rules::RuleSet;
use parking_lot::Mutex;
use thiserror::Error;

use crate::store::{RunStore, StoreError};

/// A failure reported by [`DerivationCoordinator::derive_and_record`].
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// Another derivation for this tenant is in flight. Recoverable: retry
    /// once the current run finishes.
    #[error("a derivation is already in flight for tenant {tenant}")]
    ConcurrentDerivation {
        /// The tenant whose slot is occupied.
        tenant: TenantId,
    },

    /// The engine aborted. A failed run was recorded; the tenant's last
    /// completed scope is untouched.
    #[error("derivation failed (recorded as run {run_id}): {source}")]
    DerivationFailed {
        /// The recorded failed run.
        run_id: RunId,
        /// The engine error.
        #[source]
        source: DeriveError,
    },

    /// The store refused the record.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Serializes derivations per tenant and records every outcome.
///
/// The in-flight marker is held for the duration of one
/// [`derive_and_record()`](Self::derive_and_record) call and released on
/// every path out of it, including panics, via a drop guard.
pub struct DerivationCoordinator<S: RunStore> {
    store: S,
    config: DeriveConfig,
    in_flight: Mutex<HashSet<TenantId>>,
}

impl<S: RunStore> DerivationCoordinator<S> {
    /// Create a coordinator with the default engine configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, DeriveConfig::default())
    }

    /// Create a coordinator with an explicit engine configuration.
    pub fn with_config(store: S, config: DeriveConfig) -> Self {
        Self {
            store,
            config,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run a derivation for one tenant and record the outcome.
    ///
    /// On success the completed run is persisted and returned. On engine
    /// failure a failed run (empty item list) is persisted for audit and
    /// the error is returned; the previous completed run, if any, remains
    /// the tenant's scope.
    ///
    /// # Errors
    ///
    /// [`CoordinatorError::ConcurrentDerivation`] when the tenant already
    /// has a run in flight; [`CoordinatorError::DerivationFailed`] when the
    /// engine aborted; [`CoordinatorError::Store`] when persistence failed.
    pub fn derive_and_record(
        &self,
        profile: &OrganizationProfile,
        snapshot: &CatalogSnapshot,
        rules: &RuleSet,
    ) -> Result<DerivationRun, CoordinatorError> {
        let tenant = profile.tenant_id;
        let _guard = self.acquire(tenant)?;

        match derive(profile, snapshot, rules, &self.config) {
            Ok(run) => {
                self.store.persist(run.clone())?;
                Ok(run)
            }
            Err(e) => {
                tracing::warn!(tenant = %tenant, error = %e, "derivation failed, recording failed run");
                let failed = DerivationRun::failed(
                    tenant,
                    snapshot.version().clone(),
                    profile.clone(),
                    e.to_string(),
                );
                let run_id = failed.id;
                self.store.persist(failed)?;
                Err(CoordinatorError::DerivationFailed { run_id, source: e })
            }
        }
    }

    fn acquire(&self, tenant: TenantId) -> Result<InFlightGuard<'_>, CoordinatorError> {
        let mut slots = self.in_flight.lock();
        if !slots.insert(tenant) {
            return Err(CoordinatorError::ConcurrentDerivation { tenant });
        }
        Ok(InFlightGuard {
            tenant,
            slots: &self.in_flight,
        })
    }
}

/// Releases the tenant's in-flight slot when dropped.
#[derive(Debug)]
struct InFlightGuard<'a> {
    tenant: TenantId,
    slots: &'a Mutex<HashSet<TenantId>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.slots.lock().remove(&self.tenant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRunStore;
    use nitaq_catalog::CatalogItem;
    use nitaq_core::{CatalogItemId, CatalogItemType, CatalogVersion, RuleId};
    use nitaq_engine::RunStatus;
    use nitaq_rules::{ConditionNode, Operator, Rule, RuleOutcome};
    use std::time::Duration;

    fn snapshot() -> (CatalogSnapshot, CatalogItemId) {
        let regulator = CatalogItemId::new();
        let framework = CatalogItemId::new();
        let items = vec![
            CatalogItem::root(regulator, CatalogItemType::Regulator, "NCA", "NCA"),
            CatalogItem::child(
                framework,
                CatalogItemType::Framework,
                regulator,
                "NCA-ECC",
                "Essential Cybersecurity Controls",
            ),
        ];
        (
            CatalogSnapshot::new(CatalogVersion::new("v1").unwrap(), items).unwrap(),
            framework,
        )
    }

    fn include_rule(target: CatalogItemId) -> Rule {
        Rule {
            id: RuleId::new(),
            target,
            outcome: RuleOutcome::Include,
            priority: 10,
            active: true,
            version: CatalogVersion::new("v1").unwrap(),
            condition: ConditionNode::leaf("country", Operator::Equals, "SA"),
            description: None,
        }
    }

    fn saudi_profile() -> OrganizationProfile {
        OrganizationProfile {
            country: Some("SA".to_string()),
            ..OrganizationProfile::empty(TenantId::new())
        }
    }

    #[test]
    fn successful_run_is_persisted_and_returned() {
        let (snap, framework) = snapshot();
        let rules = RuleSet::load(vec![include_rule(framework)], &snap);
        let coordinator = DerivationCoordinator::new(InMemoryRunStore::new());
        let profile = saudi_profile();

        let run = coordinator.derive_and_record(&profile, &snap, &rules).unwrap();
        assert_eq!(run.status, RunStatus::Completed);

        let stored = coordinator.store().latest(&profile.tenant_id).unwrap();
        assert_eq!(stored.id, run.id);
    }

    #[test]
    fn engine_failure_records_failed_run_and_preserves_scope() {
        let (snap, framework) = snapshot();
        let rules = RuleSet::load(vec![include_rule(framework)], &snap);
        let store = InMemoryRunStore::new();
        let profile = saudi_profile();

        // First a good run with a normal budget.
        let coordinator = DerivationCoordinator::new(store);
        let good = coordinator.derive_and_record(&profile, &snap, &rules).unwrap();

        // Then force a budget failure on the same store.
        let coordinator = DerivationCoordinator::with_config(
            coordinator.store,
            DeriveConfig {
                budget: Duration::ZERO,
            },
        );
        let err = coordinator
            .derive_and_record(&profile, &snap, &rules)
            .unwrap_err();
        let failed_run_id = match err {
            CoordinatorError::DerivationFailed { run_id, .. } => run_id,
            other => panic!("expected DerivationFailed, got {other:?}"),
        };

        let history = coordinator.store().history(&profile.tenant_id);
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].id, failed_run_id);
        assert_eq!(history[1].status, RunStatus::Failed);
        assert!(history[1].items.is_empty());

        // The completed run is still the tenant's scope.
        let current = coordinator.store().latest_completed(&profile.tenant_id).unwrap();
        assert_eq!(current.id, good.id);
    }

    #[test]
    fn in_flight_slot_released_after_run() {
        let (snap, framework) = snapshot();
        let rules = RuleSet::load(vec![include_rule(framework)], &snap);
        let coordinator = DerivationCoordinator::new(InMemoryRunStore::new());
        let profile = saudi_profile();

        coordinator.derive_and_record(&profile, &snap, &rules).unwrap();
        // A second sequential run must not see a stale in-flight marker.
        coordinator.derive_and_record(&profile, &snap, &rules).unwrap();
        assert_eq!(coordinator.store().history(&profile.tenant_id).len(), 2);
    }

    #[test]
    fn concurrent_derivation_refused_while_slot_held() {
        let coordinator = DerivationCoordinator::new(InMemoryRunStore::new());
        let tenant = TenantId::new();

        let _guard = coordinator.acquire(tenant).unwrap();
        match coordinator.acquire(tenant) {
            Err(CoordinatorError::ConcurrentDerivation { tenant: t }) => {
                assert_eq!(t, tenant);
            }
            other => panic!("expected ConcurrentDerivation, got {other:?}"),
        };
    }

    #[test]
    fn different_tenants_do_not_conflict() {
        let coordinator = DerivationCoordinator::new(InMemoryRunStore::new());
        let _a = coordinator.acquire(TenantId::new()).unwrap();
        assert!(coordinator.acquire(TenantId::new()).is_ok());
    }
}
