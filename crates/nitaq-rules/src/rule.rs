//! Rules and version-bound rule sets.

use std::collections::HashMap;

use nitaq_catalog::CatalogSnapshot;
use nitaq_core::{CatalogItemId, CatalogVersion, RuleId};
use serde::{Deserialize, Serialize};

use crate::condition::ConditionNode;

/// What a matching rule asserts about its target item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    /// The target item is in scope.
    Include,
    /// The target item is out of scope. Exclusion always wins over
    /// inclusion, regardless of priority.
    Exclude,
}

impl RuleOutcome {
    /// The snake_case identifier string, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Exclude => "exclude",
        }
    }
}

impl std::fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_priority() -> i32 {
    100
}

fn default_active() -> bool {
    true
}

/// An applicability rule binding a condition tree to a catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule identifier.
    pub id: RuleId,

    /// The catalog item this rule speaks about.
    pub target: CatalogItemId,

    /// Whether a match includes or excludes the target.
    pub outcome: RuleOutcome,

    /// Tie-break among matching rules of the same outcome; lower wins.
    /// Never lets an include beat an exclude.
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Inactive rules are skipped at load without being an error.
    #[serde(default = "default_active")]
    pub active: bool,

    /// The catalog version this rule was authored against.
    pub version: CatalogVersion,

    /// The condition a profile must satisfy for this rule to match.
    pub condition: ConditionNode,

    /// Author-facing note, carried through for audit display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The shape of a rules content file (JSON or YAML).
#[derive(Debug, Clone, Deserialize)]
pub struct RulesFile {
    /// The rules, in any order; [`RuleSet::load()`] sorts per target.
    pub rules: Vec<Rule>,
}

/// A rule refused at load time, kept for audit alongside the log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRule {
    /// The refused rule.
    pub rule_id: RuleId,
    /// Human-readable refusal reason.
    pub reason: String,
}

/// A loaded, validated set of rules bound to one catalog version.
///
/// Loading is tolerant per rule and strict per set: a malformed rule is
/// recorded in [`rejected()`](RuleSet::rejected) and logged, while the rest
/// of the set stays usable. Rules for a given target are held sorted by
/// `(priority, rule id)` so downstream evaluation order is deterministic.
#[derive(Debug, Clone)]
pub struct RuleSet {
    version: CatalogVersion,
    by_target: HashMap<CatalogItemId, Vec<Rule>>,
    accepted: usize,
    rejected: Vec<RejectedRule>,
}

impl RuleSet {
    /// Load rules against a catalog snapshot.
    ///
    /// Skips (without recording) rules that are inactive or bound to a
    /// different catalog version. Rejects (recording and warning) rules
    /// whose condition tree fails validation or whose target is not in the
    /// snapshot.
    pub fn load(rules: Vec<Rule>, snapshot: &CatalogSnapshot) -> Self {
        let version = snapshot.version().clone();
        let mut by_target: HashMap<CatalogItemId, Vec<Rule>> = HashMap::new();
        let mut accepted = 0usize;
        let mut rejected = Vec::new();

        for rule in rules {
            if !rule.active {
                tracing::debug!(rule_id = %rule.id, "skipping inactive rule");
                continue;
            }
            if rule.version != version {
                tracing::debug!(
                    rule_id = %rule.id,
                    rule_version = %rule.version,
                    catalog_version = %version,
                    "skipping rule bound to another catalog version"
                );
                continue;
            }
            if let Err(e) = rule.condition.validate() {
                tracing::warn!(rule_id = %rule.id, error = %e, "rejecting rule with invalid condition");
                rejected.push(RejectedRule {
                    rule_id: rule.id,
                    reason: format!("invalid condition: {e}"),
                });
                continue;
            }
            if !snapshot.contains(&rule.target) {
                tracing::warn!(
                    rule_id = %rule.id,
                    target = %rule.target,
                    "rejecting rule targeting an item not in the catalog"
                );
                rejected.push(RejectedRule {
                    rule_id: rule.id,
                    reason: format!("target {} not in catalog", rule.target),
                });
                continue;
            }

            accepted += 1;
            by_target.entry(rule.target).or_default().push(rule);
        }

        for rules in by_target.values_mut() {
            rules.sort_by_key(|r| (r.priority, r.id));
        }

        Self {
            version,
            by_target,
            accepted,
            rejected,
        }
    }

    /// The catalog version this set is bound to.
    pub fn version(&self) -> &CatalogVersion {
        &self.version
    }

    /// The rules targeting an item, sorted by `(priority, rule id)`.
    /// Empty when no rule speaks about the item.
    pub fn rules_for(&self, target: &CatalogItemId) -> &[Rule] {
        self.by_target.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of rules accepted at load.
    pub fn len(&self) -> usize {
        self.accepted
    }

    /// True if no rules were accepted.
    pub fn is_empty(&self) -> bool {
        self.accepted == 0
    }

    /// Rules refused at load, in input order.
    pub fn rejected(&self) -> &[RejectedRule] {
        &self.rejected
    }
}
