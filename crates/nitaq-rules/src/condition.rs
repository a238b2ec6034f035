//! Condition trees and their structural validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum nesting depth of a condition tree.
///
/// The serde representation cannot express sharing or cycles, so a depth
/// bound is the complete guard against runaway nesting in authored or
/// imported rule content.
pub const MAX_CONDITION_DEPTH: usize = 32;

/// Comparison operator of a leaf condition.
///
/// String comparisons are case-insensitive at evaluation time;
/// `greater_than` compares numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Attribute equals the value.
    Equals,
    /// Attribute differs from the value (fails closed when absent).
    NotEquals,
    /// Attribute is numerically greater than the value.
    GreaterThan,
    /// Attribute equals one of the listed values.
    InSet,
    /// A set-valued attribute contains the value, or a scalar attribute
    /// contains it as a substring.
    Contains,
}

impl Operator {
    /// The snake_case identifier string, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::GreaterThan => "greater_than",
            Self::InSet => "in_set",
            Self::Contains => "contains",
        }
    }

    /// True if this operator compares against the list operand (`values`)
    /// rather than the single `value`.
    pub fn takes_value_list(&self) -> bool {
        matches!(self, Self::InSet)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of a rule's condition tree.
///
/// Leaves compare one profile attribute against an operand; branches
/// combine children with boolean logic. Trees arrive from rule content as
/// JSON or YAML and are validated once at load, after which evaluation is
/// total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionNode {
    /// An attribute comparison.
    Leaf {
        /// Profile attribute name (case-insensitive).
        attribute: String,
        /// Comparison operator.
        operator: Operator,
        /// Single operand, required by every operator except `in_set`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        /// List operand, required by `in_set`.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        values: Vec<String>,
    },
    /// Satisfied when all children are satisfied.
    And {
        /// Child conditions, at least one.
        conditions: Vec<ConditionNode>,
    },
    /// Satisfied when any child is satisfied.
    Or {
        /// Child conditions, at least one.
        conditions: Vec<ConditionNode>,
    },
    /// Inverts its child.
    Not {
        /// The negated condition.
        condition: Box<ConditionNode>,
    },
}

impl ConditionNode {
    /// Convenience constructor for a single-operand leaf.
    pub fn leaf(attribute: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self::Leaf {
            attribute: attribute.into(),
            operator,
            value: Some(value.into()),
            values: Vec::new(),
        }
    }

    /// Convenience constructor for an `in_set` leaf.
    pub fn in_set(attribute: impl Into<String>, values: Vec<String>) -> Self {
        Self::Leaf {
            attribute: attribute.into(),
            operator: Operator::InSet,
            value: None,
            values,
        }
    }

    /// Check the structural invariants of this tree.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: an empty `and`/`or` branch, a
    /// leaf with a blank attribute or the wrong operand shape for its
    /// operator, or nesting beyond [`MAX_CONDITION_DEPTH`].
    pub fn validate(&self) -> Result<(), ConditionError> {
        self.validate_at(1)
    }

    fn validate_at(&self, depth: usize) -> Result<(), ConditionError> {
        if depth > MAX_CONDITION_DEPTH {
            return Err(ConditionError::TooDeep { depth });
        }
        match self {
            Self::Leaf {
                attribute,
                operator,
                value,
                values,
            } => {
                if attribute.trim().is_empty() {
                    return Err(ConditionError::EmptyAttribute);
                }
                if operator.takes_value_list() {
                    if values.is_empty() {
                        return Err(ConditionError::MissingValues {
                            attribute: attribute.clone(),
                        });
                    }
                    if value.is_some() {
                        return Err(ConditionError::UnexpectedOperand {
                            attribute: attribute.clone(),
                            operator: *operator,
                        });
                    }
                } else {
                    if value.is_none() {
                        return Err(ConditionError::MissingValue {
                            attribute: attribute.clone(),
                            operator: *operator,
                        });
                    }
                    if !values.is_empty() {
                        return Err(ConditionError::UnexpectedOperand {
                            attribute: attribute.clone(),
                            operator: *operator,
                        });
                    }
                }
                Ok(())
            }
            Self::And { conditions } => {
                if conditions.is_empty() {
                    return Err(ConditionError::EmptyBranch { kind: "and" });
                }
                conditions.iter().try_for_each(|c| c.validate_at(depth + 1))
            }
            Self::Or { conditions } => {
                if conditions.is_empty() {
                    return Err(ConditionError::EmptyBranch { kind: "or" });
                }
                conditions.iter().try_for_each(|c| c.validate_at(depth + 1))
            }
            Self::Not { condition } => condition.validate_at(depth + 1),
        }
    }
}

/// A structural defect in a condition tree, detected at rule load.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConditionError {
    /// Nesting exceeds [`MAX_CONDITION_DEPTH`].
    #[error("condition tree exceeds maximum depth at level {depth}")]
    TooDeep {
        /// The depth at which the bound was crossed.
        depth: usize,
    },

    /// An `and` or `or` branch has no children.
    #[error("empty {kind} branch")]
    EmptyBranch {
        /// Which branch kind was empty.
        kind: &'static str,
    },

    /// A leaf names a blank attribute.
    #[error("leaf condition has an empty attribute name")]
    EmptyAttribute,

    /// A single-operand operator is missing its `value`.
    #[error("operator {operator} on attribute {attribute:?} requires a value")]
    MissingValue {
        /// The leaf's attribute.
        attribute: String,
        /// The operator lacking its operand.
        operator: Operator,
    },

    /// An `in_set` leaf has an empty `values` list.
    #[error("in_set on attribute {attribute:?} requires a non-empty values list")]
    MissingValues {
        /// The leaf's attribute.
        attribute: String,
    },

    /// A leaf carries the operand shape of the other operator family.
    #[error("operator {operator} on attribute {attribute:?} carries an unexpected operand")]
    UnexpectedOperand {
        /// The leaf's attribute.
        attribute: String,
        /// The operator with the wrong operand.
        operator: Operator,
    },
}
