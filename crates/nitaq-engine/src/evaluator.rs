//! Pure condition evaluation with reason traces.
//!
//! Evaluation is total: every tree that passed
//! [`ConditionNode::validate()`](nitaq_rules::ConditionNode::validate)
//! evaluates to a boolean with human-readable reasons, whatever the profile
//! contains. Absent answers fail closed — a condition over an attribute the
//! tenant never provided is unsatisfied, with a "not provided" reason, and
//! is never an error.

use nitaq_core::{AttributeRef, OrganizationProfile};
use nitaq_rules::{ConditionNode, Operator};

/// The outcome of evaluating one condition tree against one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Whether the condition held.
    pub satisfied: bool,
    /// Natural-language fragments explaining the outcome, e.g.
    /// `"Sector = Banking"` or `"Country: not provided"`.
    pub reasons: Vec<String>,
}

/// Evaluate a condition tree against a profile.
///
/// `and`/`or` branches evaluate every child so the reason trace covers the
/// whole tree; only the booleans short-circuit logically. A satisfied `or`
/// reports the reasons of its first satisfied child; an unsatisfied one
/// reports all children.
pub fn evaluate(profile: &OrganizationProfile, node: &ConditionNode) -> Evaluation {
    match node {
        ConditionNode::Leaf {
            attribute,
            operator,
            value,
            values,
        } => evaluate_leaf(profile, attribute, *operator, value.as_deref(), values),
        ConditionNode::And { conditions } => {
            let children: Vec<Evaluation> =
                conditions.iter().map(|c| evaluate(profile, c)).collect();
            Evaluation {
                satisfied: children.iter().all(|c| c.satisfied),
                reasons: children.into_iter().flat_map(|c| c.reasons).collect(),
            }
        }
        ConditionNode::Or { conditions } => {
            let children: Vec<Evaluation> =
                conditions.iter().map(|c| evaluate(profile, c)).collect();
            match children.iter().find(|c| c.satisfied) {
                Some(first) => Evaluation {
                    satisfied: true,
                    reasons: first.reasons.clone(),
                },
                None => Evaluation {
                    satisfied: false,
                    reasons: children.into_iter().flat_map(|c| c.reasons).collect(),
                },
            }
        }
        ConditionNode::Not { condition } => {
            let child = evaluate(profile, condition);
            Evaluation {
                satisfied: !child.satisfied,
                reasons: child.reasons,
            }
        }
    }
}

fn evaluate_leaf(
    profile: &OrganizationProfile,
    attribute: &str,
    operator: Operator,
    value: Option<&str>,
    values: &[String],
) -> Evaluation {
    let label = attribute_label(attribute);

    let Some(attr) = profile.attribute(attribute) else {
        return Evaluation {
            satisfied: false,
            reasons: vec![format!("{label}: not provided")],
        };
    };

    match attr {
        AttributeRef::Scalar(actual) => {
            evaluate_scalar(&label, actual, operator, value, values)
        }
        AttributeRef::Set(members) => {
            evaluate_set(&label, members, operator, value, values)
        }
    }
}

fn evaluate_scalar(
    label: &str,
    actual: &str,
    operator: Operator,
    value: Option<&str>,
    values: &[String],
) -> Evaluation {
    // Validation guarantees the operand shape; an absent operand here
    // evaluates as the empty string rather than failing.
    let expected = value.unwrap_or_default();
    match operator {
        Operator::Equals => {
            if eq_ci(actual, expected) {
                satisfied(format!("{label} = {actual}"))
            } else {
                unsatisfied(format!("{label} = {actual}, expected {expected}"))
            }
        }
        Operator::NotEquals => {
            if !eq_ci(actual, expected) {
                satisfied(format!("{label} = {actual}"))
            } else {
                unsatisfied(format!("{label} = {actual}, expected not {expected}"))
            }
        }
        Operator::GreaterThan => {
            match (actual.trim().parse::<f64>(), expected.trim().parse::<f64>()) {
                (Ok(a), Ok(b)) => {
                    if a > b {
                        satisfied(format!("{label} = {actual}"))
                    } else {
                        unsatisfied(format!("{label} = {actual}, expected greater than {expected}"))
                    }
                }
                _ => unsatisfied(format!(
                    "{label} = {actual}, not numerically comparable to {expected}"
                )),
            }
        }
        Operator::InSet => {
            if values.iter().any(|v| eq_ci(actual, v)) {
                satisfied(format!("{label} = {actual}"))
            } else {
                unsatisfied(format!(
                    "{label} = {actual}, expected one of {}",
                    values.join(", ")
                ))
            }
        }
        Operator::Contains => {
            if actual.to_lowercase().contains(&expected.to_lowercase()) {
                satisfied(format!("{label} = {actual}"))
            } else {
                unsatisfied(format!("{label} = {actual}, expected to contain {expected}"))
            }
        }
    }
}

fn evaluate_set(
    label: &str,
    members: &[String],
    operator: Operator,
    value: Option<&str>,
    values: &[String],
) -> Evaluation {
    let expected = value.unwrap_or_default();
    let joined = members.join(", ");
    match operator {
        // Membership reading for equality on a set-valued answer.
        Operator::Equals | Operator::Contains => {
            if members.iter().any(|m| eq_ci(m, expected)) {
                satisfied(format!("{label} includes {expected}"))
            } else {
                unsatisfied(format!("{label} = [{joined}], expected to contain {expected}"))
            }
        }
        Operator::NotEquals => {
            if members.iter().any(|m| eq_ci(m, expected)) {
                unsatisfied(format!("{label} = [{joined}], expected not to contain {expected}"))
            } else {
                satisfied(format!("{label} does not include {expected}"))
            }
        }
        Operator::InSet => {
            if members
                .iter()
                .any(|m| values.iter().any(|v| eq_ci(m, v)))
            {
                satisfied(format!("{label} overlaps {}", values.join(", ")))
            } else {
                unsatisfied(format!(
                    "{label} = [{joined}], expected one of {}",
                    values.join(", ")
                ))
            }
        }
        // A set of strings has no numeric ordering; fail closed.
        Operator::GreaterThan => {
            unsatisfied(format!("{label} = [{joined}], not numerically comparable"))
        }
    }
}

fn satisfied(reason: String) -> Evaluation {
    Evaluation {
        satisfied: true,
        reasons: vec![reason],
    }
}

fn unsatisfied(reason: String) -> Evaluation {
    Evaluation {
        satisfied: false,
        reasons: vec![reason],
    }
}

fn eq_ci(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Display label for an attribute name: snake_case to spaced title case
/// (`"size_tier"` becomes `"Size Tier"`).
pub fn attribute_label(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
