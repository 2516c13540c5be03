//! Operator catalog and filter primitive.
//!
//! [`Op`] is the closed set of comparison/match kinds understood by the service.
//! Each kind maps to exactly one SQL operator token; several kinds share a token
//! (`Contains`, `StartsWith`, `EndsWith` all render `LIKE`) and the caller is
//! expected to put the wildcards into the value itself.
//!
//! # Example
//! ```ignore
//! use nqorm::{Filter, Op};
//!
//! assert_eq!(Op::GreaterThan.sql_token(), ">");
//! let op: Op = ">=".parse()?;
//! let f = Filter::new("age", op, 18)?;
//! # Ok::<(), nqorm::NqError>(())
//! ```

use crate::error::{NqError, NqResult};
use crate::value::{FilterValue, Scalar};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison/match kind.
///
/// Serialized with the names the REST endpoints expect (`"Equal"`, `"NeuralSimilar"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    /// `=`
    #[serde(rename = "Equal")]
    Equals,
    /// `!=`
    #[serde(rename = "NotEqual")]
    NotEquals,
    /// `>`
    GreaterThan,
    /// `<`
    LessThan,
    /// `>=`
    #[serde(rename = "GreaterEqual")]
    GreaterThanOrEqual,
    /// `<=`
    #[serde(rename = "LessEqual")]
    LessThanOrEqual,
    /// `IN (...)`
    In,
    /// `NOT IN (...)`
    NotIn,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
    /// `LIKE`, value carries `%...%`
    Contains,
    /// `LIKE`, value carries `...%`
    StartsWith,
    /// `LIKE`, value carries `%...`
    EndsWith,
    /// `NEUROMATCH`
    #[serde(rename = "NeuralSimilar")]
    NeuralSimilarity,
    /// `QUANTUM_ENTANGLE`
    #[serde(rename = "QuantumEntangled")]
    QuantumEntanglement,
}

impl Op {
    /// Every operator in the catalog.
    pub const ALL: [Op; 17] = [
        Op::Equals,
        Op::NotEquals,
        Op::GreaterThan,
        Op::LessThan,
        Op::GreaterThanOrEqual,
        Op::LessThanOrEqual,
        Op::In,
        Op::NotIn,
        Op::Like,
        Op::NotLike,
        Op::IsNull,
        Op::IsNotNull,
        Op::Contains,
        Op::StartsWith,
        Op::EndsWith,
        Op::NeuralSimilarity,
        Op::QuantumEntanglement,
    ];

    /// The SQL operator token for this kind.
    pub const fn sql_token(self) -> &'static str {
        match self {
            Op::Equals => "=",
            Op::NotEquals => "!=",
            Op::GreaterThan => ">",
            Op::LessThan => "<",
            Op::GreaterThanOrEqual => ">=",
            Op::LessThanOrEqual => "<=",
            Op::In => "IN",
            Op::NotIn => "NOT IN",
            Op::Like | Op::Contains | Op::StartsWith | Op::EndsWith => "LIKE",
            Op::NotLike => "NOT LIKE",
            Op::IsNull => "IS NULL",
            Op::IsNotNull => "IS NOT NULL",
            Op::NeuralSimilarity => "NEUROMATCH",
            Op::QuantumEntanglement => "QUANTUM_ENTANGLE",
        }
    }

    /// The name used in REST payloads.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Op::Equals => "Equal",
            Op::NotEquals => "NotEqual",
            Op::GreaterThan => "GreaterThan",
            Op::LessThan => "LessThan",
            Op::GreaterThanOrEqual => "GreaterEqual",
            Op::LessThanOrEqual => "LessEqual",
            Op::In => "In",
            Op::NotIn => "NotIn",
            Op::Like => "Like",
            Op::NotLike => "NotLike",
            Op::IsNull => "IsNull",
            Op::IsNotNull => "IsNotNull",
            Op::Contains => "Contains",
            Op::StartsWith => "StartsWith",
            Op::EndsWith => "EndsWith",
            Op::NeuralSimilarity => "NeuralSimilar",
            Op::QuantumEntanglement => "QuantumEntangled",
        }
    }

    /// `IN` / `NOT IN` take a list.
    pub const fn takes_list(self) -> bool {
        matches!(self, Op::In | Op::NotIn)
    }

    /// `IS NULL` / `IS NOT NULL` take no value.
    pub const fn takes_no_value(self) -> bool {
        matches!(self, Op::IsNull | Op::IsNotNull)
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_token())
    }
}

/// Parses wire names (`"Equal"`) and the unambiguous SQL tokens (`"="`, `"NOT IN"`).
///
/// `"LIKE"` parses to [`Op::Like`]; tokens are matched case-insensitively.
impl FromStr for Op {
    type Err = NqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(op) = Op::ALL.iter().copied().find(|op| op.wire_name() == s) {
            return Ok(op);
        }
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        let op = match normalized.as_str() {
            "=" | "==" => Op::Equals,
            "!=" | "<>" => Op::NotEquals,
            ">" => Op::GreaterThan,
            "<" => Op::LessThan,
            ">=" => Op::GreaterThanOrEqual,
            "<=" => Op::LessThanOrEqual,
            "IN" => Op::In,
            "NOT IN" => Op::NotIn,
            "LIKE" => Op::Like,
            "NOT LIKE" => Op::NotLike,
            "IS NULL" => Op::IsNull,
            "IS NOT NULL" => Op::IsNotNull,
            "NEUROMATCH" => Op::NeuralSimilarity,
            "QUANTUM_ENTANGLE" => Op::QuantumEntanglement,
            _ => return Err(NqError::UnknownOperator(s.to_string())),
        };
        Ok(op)
    }
}

/// A single `column <op> value` predicate.
///
/// Invariants (checked by [`Filter::new`]):
/// - `IS NULL` / `IS NOT NULL` carry [`FilterValue::None`]
/// - `IN` / `NOT IN` carry [`FilterValue::List`]
/// - every other operator carries [`FilterValue::Single`]
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    column: String,
    op: Op,
    value: FilterValue,
}

impl Filter {
    /// Create a filter, normalizing the value shape where it is unambiguous.
    ///
    /// - a value given to `IS NULL` / `IS NOT NULL` is dropped
    /// - a single scalar given to `IN` / `NOT IN` becomes a one-element list
    ///
    /// A list given to a non-list operator is an error, as is a missing or
    /// `NULL` value for any operator other than `IS NULL` / `IS NOT NULL`.
    pub fn new(column: impl Into<String>, op: Op, value: impl Into<FilterValue>) -> NqResult<Self> {
        let column = column.into();
        if column.trim().is_empty() {
            return Err(NqError::invalid_filter(column, "column name is empty"));
        }
        let value = match (op.takes_no_value(), op.takes_list(), value.into()) {
            (true, _, _) => FilterValue::None,
            (_, _, FilterValue::None) | (_, _, FilterValue::Single(Scalar::Null)) => {
                return Err(NqError::invalid_filter(
                    column,
                    format!(
                        "operator {} needs a value; use IS NULL / IS NOT NULL for NULL",
                        op.wire_name()
                    ),
                ));
            }
            (_, true, FilterValue::List(values)) => FilterValue::List(values),
            (_, true, FilterValue::Single(v)) => FilterValue::List(vec![v]),
            (_, false, FilterValue::List(_)) => {
                return Err(NqError::invalid_filter(
                    column,
                    format!("operator {} does not accept a list", op.wire_name()),
                ));
            }
            (_, false, single) => single,
        };
        Ok(Self { column, op, value })
    }

    /// `column IS NULL`
    pub fn is_null(column: impl Into<String>) -> NqResult<Self> {
        Self::new(column, Op::IsNull, FilterValue::None)
    }

    /// `column IS NOT NULL`
    pub fn is_not_null(column: impl Into<String>) -> NqResult<Self> {
        Self::new(column, Op::IsNotNull, FilterValue::None)
    }

    /// `column = value`
    pub fn eq(column: impl Into<String>, value: impl Into<FilterValue>) -> NqResult<Self> {
        Self::new(column, Op::Equals, value)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }
}
