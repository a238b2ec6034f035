//! Scope resolution: per-item verdicts under deny-overrides, aggregated
//! child-before-parent across the catalog forest.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use nitaq_catalog::CatalogSnapshot;
use nitaq_core::{CatalogItemId, CatalogVersion, OrganizationProfile, RuleId, RunId, Timestamp};
use nitaq_rules::{Rule, RuleOutcome, RuleSet};
use thiserror::Error;

use crate::evaluator::{evaluate, Evaluation};
use crate::run::{DerivationRun, DerivedScopeItem, RunStatus};

/// Knobs for a derivation run.
#[derive(Debug, Clone)]
pub struct DeriveConfig {
    /// Wall-clock budget for the whole run. A run that crosses it aborts
    /// with [`DeriveError::BudgetExceeded`] rather than holding the
    /// tenant's in-flight slot indefinitely.
    pub budget: Duration,
}

impl Default for DeriveConfig {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(30),
        }
    }
}

/// A failure that aborts the whole run.
#[derive(Error, Debug)]
pub enum DeriveError {
    /// The rule set was loaded against a different catalog version.
    #[error("rule set is bound to catalog version {rules}, snapshot is {catalog}")]
    VersionMismatch {
        /// The snapshot's version.
        catalog: CatalogVersion,
        /// The rule set's version.
        rules: CatalogVersion,
    },

    /// The run crossed its wall-clock budget.
    #[error("derivation exceeded its {budget_ms} ms budget")]
    BudgetExceeded {
        /// The configured budget in milliseconds.
        budget_ms: u128,
    },
}

/// Working verdict for one item while the run is in progress.
struct Verdict {
    included: bool,
    /// An exclude rule matched; transitive inclusion must not override.
    explicitly_excluded: bool,
    reasons: Vec<String>,
    matched_rule_ids: Vec<RuleId>,
}

/// Derive the full scope for one tenant profile.
///
/// Walks the catalog deepest level first so every child verdict is final
/// before its parent's. Per item, rule outcomes reduce under
/// deny-overrides; an item no satisfied rule speaks for is excluded unless
/// an included child pulls it in transitively, and an explicit exclusion
/// resists even that.
///
/// # Errors
///
/// Fails only on a catalog/ruleset version mismatch or on crossing the
/// wall-clock budget. Per-rule problems were already handled at load and
/// never abort a run.
pub fn derive(
    profile: &OrganizationProfile,
    snapshot: &CatalogSnapshot,
    rules: &RuleSet,
    config: &DeriveConfig,
) -> Result<DerivationRun, DeriveError> {
    if rules.version() != snapshot.version() {
        return Err(DeriveError::VersionMismatch {
            catalog: snapshot.version().clone(),
            rules: rules.version().clone(),
        });
    }

    let started = Instant::now();
    tracing::info!(
        tenant = %profile.tenant_id,
        catalog_version = %snapshot.version(),
        items = snapshot.len(),
        rules = rules.len(),
        "starting scope derivation"
    );

    let mut verdicts: HashMap<CatalogItemId, Verdict> = HashMap::with_capacity(snapshot.len());

    for group in snapshot.levels_deepest_first() {
        for item_id in group {
            if started.elapsed() > config.budget {
                return Err(DeriveError::BudgetExceeded {
                    budget_ms: config.budget.as_millis(),
                });
            }

            let mut verdict = resolve_item(profile, rules.rules_for(&item_id));

            // Child-driven inclusion: an undecided ancestor of an included
            // item is pulled into scope. An explicit exclusion stands.
            if !verdict.included && !verdict.explicitly_excluded {
                let included_children: Vec<&str> = snapshot
                    .children_of(&item_id)
                    .iter()
                    .filter(|child| verdicts.get(child).is_some_and(|v| v.included))
                    .filter_map(|child| snapshot.get(child).map(|c| c.code.as_str()))
                    .collect();
                if !included_children.is_empty() {
                    verdict.included = true;
                    for code in included_children {
                        verdict.reasons.push(format!("Contains in-scope {code}"));
                    }
                }
            }

            verdicts.insert(item_id, verdict);
        }
    }

    let items: Vec<DerivedScopeItem> = snapshot
        .items()
        .iter()
        .filter_map(|item| {
            let verdict = verdicts.remove(&item.id)?;
            Some(DerivedScopeItem {
                item_id: item.id,
                item_type: item.item_type,
                code: item.code.clone(),
                included: verdict.included,
                reasons: verdict.reasons,
                matched_rule_ids: verdict.matched_rule_ids,
            })
        })
        .collect();

    let included = items.iter().filter(|i| i.included).count();
    tracing::info!(
        tenant = %profile.tenant_id,
        included,
        excluded = items.len() - included,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scope derivation completed"
    );

    Ok(DerivationRun {
        id: RunId::new(),
        tenant_id: profile.tenant_id,
        catalog_version: snapshot.version().clone(),
        profile: profile.clone(),
        status: RunStatus::Completed,
        created_at: Timestamp::now(),
        items,
        failure: None,
    })
}

/// Reduce one item's rules to a verdict under deny-overrides.
///
/// `rules` arrives sorted by `(priority, rule id)`, so "first satisfied"
/// is "highest-priority satisfied". The primary trace comes from the
/// highest-priority rule of the winning outcome; `matched_rule_ids`
/// records every satisfied rule regardless of outcome.
fn resolve_item(profile: &OrganizationProfile, rules: &[Rule]) -> Verdict {
    let evaluations: Vec<(&Rule, Evaluation)> = rules
        .iter()
        .map(|rule| (rule, evaluate(profile, &rule.condition)))
        .collect();

    let mut matched_rule_ids: Vec<RuleId> = evaluations
        .iter()
        .filter(|(_, e)| e.satisfied)
        .map(|(r, _)| r.id)
        .collect();
    matched_rule_ids.sort();

    let first_satisfied = |outcome: RuleOutcome| {
        evaluations
            .iter()
            .find(|(r, e)| e.satisfied && r.outcome == outcome)
    };

    if let Some((_, evaluation)) = first_satisfied(RuleOutcome::Exclude) {
        return Verdict {
            included: false,
            explicitly_excluded: true,
            reasons: evaluation.reasons.clone(),
            matched_rule_ids,
        };
    }

    if let Some((_, evaluation)) = first_satisfied(RuleOutcome::Include) {
        return Verdict {
            included: true,
            explicitly_excluded: false,
            reasons: evaluation.reasons.clone(),
            matched_rule_ids,
        };
    }

    // Rules exist but none matched: excluded, tracing why the
    // highest-priority rule did not fire.
    let reasons = evaluations
        .first()
        .map(|(_, e)| e.reasons.clone())
        .unwrap_or_default();

    Verdict {
        included: false,
        explicitly_excluded: false,
        reasons,
        matched_rule_ids,
    }
}
