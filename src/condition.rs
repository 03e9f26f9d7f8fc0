//! Routing conditions: boolean predicates over document fields.
//!
//! A condition is an immutable value object owned by a fork rule. It is
//! either a leaf (`field operator value`) or a boolean combination of
//! subconditions. Evaluation is pure and total: a missing field or a type
//! mismatch is a non-match, never an error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coerce::compare;
use crate::document::Document;
use crate::value::Value;

/// Errors raised when validating a condition supplied over the wire.
///
/// Malformed conditions fail fast at fork time; they are never accepted and
/// left to silently never match.
#[derive(Debug, Error)]
pub enum ConditionError {
    /// The operator string is not one of the supported operators.
    #[error("Unknown operator: {operator}")]
    UnknownOperator {
        operator: String,
    },

    /// A required key is missing from a leaf condition.
    #[error("Condition is missing required key '{key}'")]
    MissingKey {
        key: String,
    },

    /// The condition JSON has an unexpected shape.
    #[error("Invalid condition shape: {reason}")]
    InvalidShape {
        reason: String,
    },
}

/// Comparison operators supported by leaf conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Eq,
    Neq,
    Gte,
    Gt,
    Lte,
    Lt,
    Contains,
    StartsWith,
    EndsWith,
    Exists,
}

impl Operator {
    /// Returns the wire name of this operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gte => "gte",
            Self::Gt => "gt",
            Self::Lte => "lte",
            Self::Lt => "lt",
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::Exists => "exists",
        }
    }
}

impl FromStr for Operator {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(Self::Eq),
            "neq" => Ok(Self::Neq),
            "gte" => Ok(Self::Gte),
            "gt" => Ok(Self::Gt),
            "lte" => Ok(Self::Lte),
            "lt" => Ok(Self::Lt),
            "contains" => Ok(Self::Contains),
            "startsWith" => Ok(Self::StartsWith),
            "endsWith" => Ok(Self::EndsWith),
            "exists" => Ok(Self::Exists),
            other => Err(ConditionError::UnknownOperator {
                operator: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A boolean predicate over a document's fields.
///
/// Wire format (as accepted by `fork`):
///
/// ```json
/// { "field": "log.logger", "operator": "eq", "value": "nginx" }
/// { "or": [
///     { "field": "message", "operator": "contains", "value": "500" },
///     { "field": "message", "operator": "contains", "value": 400 }
/// ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// True iff all subconditions are true; an empty list is true.
    And {
        and: Vec<Condition>,
    },

    /// True iff any subcondition is true; an empty list is false.
    Or {
        or: Vec<Condition>,
    },

    /// A single field comparison.
    Leaf {
        field: String,
        operator: Operator,
        #[serde(default)]
        value: Value,
    },
}

impl Condition {
    /// Creates a leaf condition.
    #[must_use]
    pub fn leaf(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self::Leaf {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Creates an `eq` leaf.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(field, Operator::Eq, value)
    }

    /// Creates a `neq` leaf.
    #[must_use]
    pub fn neq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(field, Operator::Neq, value)
    }

    /// Creates a `gte` leaf.
    #[must_use]
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(field, Operator::Gte, value)
    }

    /// Creates a `contains` leaf.
    #[must_use]
    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::leaf(field, Operator::Contains, value)
    }

    /// Creates an `exists` leaf; the rule value is ignored at evaluation.
    #[must_use]
    pub fn exists(field: impl Into<String>) -> Self {
        Self::leaf(field, Operator::Exists, Value::Null)
    }

    /// Creates a conjunction.
    #[must_use]
    pub fn and(subconditions: Vec<Condition>) -> Self {
        Self::And { and: subconditions }
    }

    /// Creates a disjunction.
    #[must_use]
    pub fn or(subconditions: Vec<Condition>) -> Self {
        Self::Or { or: subconditions }
    }

    /// Validates a wire-format JSON value into a condition.
    ///
    /// This is the fork-time entry point: unknown operators, missing keys,
    /// and malformed combinator shapes are rejected here with a precise
    /// error rather than the opaque failure an untagged deserialize gives.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, ConditionError> {
        let obj = json.as_object().ok_or_else(|| ConditionError::InvalidShape {
            reason: format!("expected a JSON object, got {json}"),
        })?;

        if let Some(subs) = obj.get("and") {
            let items = subs.as_array().ok_or_else(|| ConditionError::InvalidShape {
                reason: "'and' must hold an array of conditions".to_string(),
            })?;
            let and = items.iter().map(Self::from_json).collect::<Result<_, _>>()?;
            return Ok(Self::And { and });
        }

        if let Some(subs) = obj.get("or") {
            let items = subs.as_array().ok_or_else(|| ConditionError::InvalidShape {
                reason: "'or' must hold an array of conditions".to_string(),
            })?;
            let or = items.iter().map(Self::from_json).collect::<Result<_, _>>()?;
            return Ok(Self::Or { or });
        }

        let field = obj
            .get("field")
            .ok_or_else(|| ConditionError::MissingKey {
                key: "field".to_string(),
            })?
            .as_str()
            .ok_or_else(|| ConditionError::InvalidShape {
                reason: "'field' must be a string".to_string(),
            })?;

        let operator = obj
            .get("operator")
            .ok_or_else(|| ConditionError::MissingKey {
                key: "operator".to_string(),
            })?
            .as_str()
            .ok_or_else(|| ConditionError::InvalidShape {
                reason: "'operator' must be a string".to_string(),
            })?
            .parse::<Operator>()?;

        let value = match obj.get("value") {
            None => Value::Null,
            Some(v) => Value::from_json(v).ok_or_else(|| ConditionError::InvalidShape {
                reason: format!("'value' must be a scalar, got {v}"),
            })?,
        };

        Ok(Self::leaf(field, operator, value))
    }

    /// Evaluates this condition against a document.
    ///
    /// Pure and deterministic; combinators short-circuit in insertion order.
    /// A field that is absent (or has no scalar representation) fails to
    /// match for every operator except `exists`, and matches `neq` — absence
    /// implies "not equal".
    #[must_use]
    pub fn evaluate(&self, document: &Document) -> bool {
        match self {
            Self::And { and } => and.iter().all(|c| c.evaluate(document)),
            Self::Or { or } => or.iter().any(|c| c.evaluate(document)),
            Self::Leaf {
                field,
                operator,
                value,
            } => {
                let field_json = document.get_path(field);
                if *operator == Operator::Exists {
                    return field_json.is_some();
                }
                let Some(field_value) = field_json.and_then(Value::from_json) else {
                    return *operator == Operator::Neq;
                };
                compare(*operator, &field_value, value)
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And { and } => {
                write!(f, "and(")?;
                for (i, c) in and.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
            Self::Or { or } => {
                write!(f, "or(")?;
                for (i, c) in or.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
            Self::Leaf {
                field,
                operator,
                value,
            } => write!(f, "{field} {operator} {value}"),
        }
    }
}
