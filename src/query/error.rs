//! Query error types
//!
//! Every violation found while parsing an expression is reported as a single
//! [`QueryError`]. The error carries the raw text that was rejected together with
//! a [`QueryErrorKind`] describing the category and reason.

use thiserror::Error;

/// Category and reason of a rejected query expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Malformed syntax: unterminated quote, empty value, invalid identifier, ...
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Name is not a dimension of the cube
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    /// Name is not a measure of the cube
    #[error("unknown measure: {0}")]
    UnknownMeasure(String),

    /// Function is not an aggregate function known for the measure
    #[error("unknown aggregate function: {0}")]
    UnknownAggregate(String),

    /// Name is neither a dimension nor an aggregate
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A measure (or other non-dimension) was used where a dimension is required
    #[error("not a dimension: {0}")]
    NotADimension(String),

    /// A dimension (or other non-measure) was used where a measure is required
    #[error("not a measure: {0}")]
    NotAMeasure(String),

    /// A measure was referenced without its aggregate function suffix
    #[error("missing aggregate function for measure: {0}")]
    MissingFunction(String),

    /// Dimension does not have the requested hierarchy level
    #[error("dimension '{dimension}' has no level '{level}'")]
    UnknownLevel {
        /// Dimension name
        dimension: String,
        /// Requested level
        level: String,
    },

    /// Page or page size parameter is not acceptable
    #[error("invalid pagination: {0}")]
    InvalidPagination(String),
}

/// A rejected query expression
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Query expression error in '{input}': {kind}")]
pub struct QueryError {
    input: String,
    kind: QueryErrorKind,
}

impl QueryError {
    /// Create an error for the given raw input
    pub fn new(input: impl Into<String>, kind: QueryErrorKind) -> Self {
        Self {
            input: input.into(),
            kind,
        }
    }

    /// Shorthand for a syntax error
    pub fn syntax(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(input, QueryErrorKind::Syntax(reason.into()))
    }

    /// Attribute the error to the whole expression rather than a fragment of it
    pub(crate) fn with_input(mut self, input: &str) -> Self {
        if self.input != input {
            self.input = input.to_string();
        }
        self
    }

    /// The raw expression text that was rejected
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Error category
    pub fn kind(&self) -> &QueryErrorKind {
        &self.kind
    }

    /// Human-readable reason, suitable for a client-facing message
    pub fn reason(&self) -> String {
        self.kind.to_string()
    }

    /// Whether the expression was rejected for syntactic reasons
    pub fn is_syntax(&self) -> bool {
        matches!(self.kind, QueryErrorKind::Syntax(_))
    }
}

/// Result type for query expression parsing
pub type QueryResult<T> = Result<T, QueryError>;
