//! # nitaq-rules — Applicability Rules
//!
//! Rules decide which catalog items apply to a tenant. Each rule binds a
//! boolean condition tree over profile attributes to a target catalog item
//! and an outcome (include or exclude).
//!
//! ## Load-time validation, never evaluation-time failure
//!
//! Every structural check on a condition tree happens in
//! [`ConditionNode::validate()`], which [`RuleSet::load()`] runs per rule.
//! A malformed rule is rejected and logged; the rest of the set loads. The
//! evaluator downstream can therefore be total: it never sees a tree that
//! could make it fail.

pub mod condition;
pub mod rule;

pub use condition::{ConditionError, ConditionNode, Operator, MAX_CONDITION_DEPTH};
pub use rule::{RejectedRule, Rule, RuleOutcome, RuleSet, RulesFile};
