//! Parsed expression records
//!
//! These are the structured, immutable values produced by the expression
//! parsers and handed to the query builder. Every record renders back to the
//! textual grammar through `Display`.
//!
//! ```text
//! Cut        foo:"bar lala";3
//! Drilldown  cofog1.name
//! Aggregate  amount.sum | _count
//! OrderKey   foo:desc
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::query::tokenizer::{is_delimiter, QUOTE};
use crate::query::value::coerce;

/// Reference name of the row-count pseudo-aggregate
pub const COUNT_AGGREGATE: &str = "_count";

/// A typed value from a cut expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// Base-10 integer
    Integer(i64),
    /// Calendar date written as `YYYY-MM-DD`
    Date(NaiveDate),
    /// Any other token, or a quoted token
    String(String),
}

impl Value {
    /// Integer payload, if this is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Date payload, if this is a date
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// String payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the value type
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Date(_) => "date",
            Self::String(_) => "string",
        }
    }

    /// Render as a cut value token.
    ///
    /// Strings are quoted when they are empty, contain a delimiter or
    /// whitespace, or would otherwise be read as an integer or date. Strings
    /// holding a double quote have no exact textual form.
    pub fn to_token(&self) -> Cow<'_, str> {
        match self {
            Self::String(s) if needs_quoting(s) => Cow::Owned(format!("{QUOTE}{s}{QUOTE}")),
            Self::String(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_string()),
        }
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s.starts_with(QUOTE)
        || s.chars().any(|c| is_delimiter(c) || c.is_whitespace())
        || !matches!(coerce(s), Value::String(_))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Operator between the dimension and the value set of a cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CutOperator {
    /// Dimension value is one of the listed values (`:`)
    #[serde(rename = ":")]
    In,
}

impl CutOperator {
    /// Textual form of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => ":",
        }
    }
}

impl fmt::Display for CutOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A filter restricting a dimension to a set of values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cut {
    /// Dimension being filtered
    pub dimension: String,
    /// Comparison operator
    pub operator: CutOperator,
    /// Accepted values, in input order (never empty)
    pub values: Vec<Value>,
}

impl Cut {
    /// Create a cut using the `:` operator
    pub fn new(dimension: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            dimension: dimension.into(),
            operator: CutOperator::In,
            values,
        }
    }
}

impl fmt::Display for Cut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.dimension, self.operator)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            f.write_str(&value.to_token())?;
        }
        Ok(())
    }
}

/// A grouping request on a dimension, optionally at a hierarchy level
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Drilldown {
    /// Dimension to group by
    pub dimension: String,
    /// Optional hierarchy level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl Drilldown {
    /// Drill down on a whole dimension
    pub fn new(dimension: impl Into<String>) -> Self {
        Self {
            dimension: dimension.into(),
            level: None,
        }
    }

    /// Drill down on a level of a dimension
    pub fn at_level(dimension: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            dimension: dimension.into(),
            level: Some(level.into()),
        }
    }
}

impl fmt::Display for Drilldown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.level {
            Some(level) => write!(f, "{}.{}", self.dimension, level),
            None => f.write_str(&self.dimension),
        }
    }
}

/// A requested summary computation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aggregate {
    /// Measure being aggregated; `None` for the row count
    pub measure: Option<String>,
    /// Aggregate function name
    pub function: String,
}

impl Aggregate {
    /// Aggregate a measure with a function
    pub fn new(measure: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            measure: Some(measure.into()),
            function: function.into(),
        }
    }

    /// The row-count pseudo-aggregate
    pub fn count() -> Self {
        Self {
            measure: None,
            function: COUNT_AGGREGATE.to_string(),
        }
    }

    /// Whether this is the row-count pseudo-aggregate
    pub fn is_count(&self) -> bool {
        self.measure.is_none() && self.function == COUNT_AGGREGATE
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.measure {
            Some(measure) => write!(f, "{}.{}", measure, self.function),
            None => f.write_str(&self.function),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

impl Direction {
    /// Parse a direction token. Only the lowercase forms are accepted.
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Textual form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sort key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderKey {
    /// Dimension or aggregate reference
    pub field: String,
    /// Sort direction
    pub direction: Direction,
}

impl OrderKey {
    /// Create a sort key
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction)
    }
}

/// A column requested in a member or fact listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Field {
    /// A dimension, optionally at a level
    Dimension {
        /// Dimension name
        dimension: String,
        /// Optional hierarchy level
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<String>,
    },
    /// A raw (unaggregated) measure
    Measure {
        /// Measure name
        measure: String,
    },
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimension {
                dimension,
                level: Some(level),
            } => write!(f, "{}.{}", dimension, level),
            Self::Dimension { dimension, .. } => f.write_str(dimension),
            Self::Measure { measure } => f.write_str(measure),
        }
    }
}
