//! Shared application state.

use std::sync::Arc;

use nitaq_catalog::CatalogSnapshot;
use nitaq_rules::RuleSet;
use nitaq_store::{DerivationCoordinator, InMemoryRunStore};

/// State shared by all handlers. Everything is immutable or internally
/// synchronized, so the state clones cheaply per request.
#[derive(Clone)]
pub struct AppState {
    /// Serializes derivations and records outcomes.
    pub coordinator: Arc<DerivationCoordinator<InMemoryRunStore>>,
    /// The catalog content the service derives against.
    pub snapshot: Arc<CatalogSnapshot>,
    /// The loaded rule set, bound to the snapshot's version.
    pub rules: Arc<RuleSet>,
}

impl AppState {
    /// Assemble state from loaded content with a fresh in-memory store.
    pub fn new(snapshot: CatalogSnapshot, rules: RuleSet) -> Self {
        Self {
            coordinator: Arc::new(DerivationCoordinator::new(InMemoryRunStore::new())),
            snapshot: Arc::new(snapshot),
            rules: Arc::new(rules),
        }
    }
}
