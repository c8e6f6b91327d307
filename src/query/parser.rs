//! Expression parser plumbing
//!
//! Shared pieces of the five grammars: the [`ExpressionParser`] trait with the
//! common `parse` entry point, [`ParserOptions`], and the identifier and
//! reference rules.
//!
//! ```text
//! identifier := [A-Za-z0-9_]+
//! reference  := identifier ('.' identifier)?
//! ```

use nom::{
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{all_consuming, opt},
    sequence::{preceded, tuple},
    IResult,
};
use tracing::debug;

use crate::model::CubeSchema;
use crate::query::error::{QueryError, QueryErrorKind, QueryResult};

/// Tunables shared by all expression parsers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Reject levels the schema does not list for a dimension
    pub strict_levels: bool,
    /// Reject expressions longer than this many bytes
    pub max_expression_length: Option<usize>,
    /// Page size used when none is requested
    pub default_page_size: u64,
    /// Upper bound for requested page sizes
    pub max_page_size: u64,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            strict_levels: false,
            max_expression_length: None,
            default_page_size: 100,
            max_page_size: 10_000,
        }
    }
}

/// A parser for one expression grammar, bound to a cube schema.
///
/// Parsing is a single pass that either yields every record in input order or
/// fails on the first violation; nothing is kept between calls.
pub trait ExpressionParser {
    /// Record produced per top-level item
    type Output;

    /// Grammar name used in logs
    const GRAMMAR: &'static str;

    /// Options the parser was built with
    fn options(&self) -> &ParserOptions;

    /// Parse a non-blank expression
    fn parse_expression(&self, text: &str) -> QueryResult<Vec<Self::Output>>;

    /// Parse an optional expression. Absent or blank text yields no records.
    fn parse(&self, text: Option<&str>) -> QueryResult<Vec<Self::Output>> {
        let text = match text {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Ok(Vec::new()),
        };

        if let Some(max) = self.options().max_expression_length {
            if text.len() > max {
                return Err(QueryError::syntax(
                    text,
                    format!("expression longer than {} bytes", max),
                ));
            }
        }

        debug!(grammar = Self::GRAMMAR, input = text, "Parsing expression");
        match self.parse_expression(text) {
            Ok(records) => {
                debug!(
                    grammar = Self::GRAMMAR,
                    count = records.len(),
                    "Parsed expression"
                );
                Ok(records)
            }
            Err(err) => {
                let err = err.with_input(text);
                debug!(grammar = Self::GRAMMAR, error = %err, "Rejected expression");
                Err(err)
            }
        }
    }
}

/// Whether `name` can be written as a bare name in an expression
pub fn is_identifier(name: &str) -> bool {
    all_consuming(identifier)(name).is_ok()
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn dotted(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    tuple((identifier, opt(preceded(char('.'), identifier))))(input)
}

/// Check that a segment is a bare identifier
pub(crate) fn parse_identifier<'a>(raw: &'a str, what: &str) -> QueryResult<&'a str> {
    if raw.is_empty() {
        return Err(QueryError::syntax(raw, format!("missing {}", what)));
    }
    if !is_identifier(raw) {
        return Err(QueryError::syntax(
            raw,
            format!("invalid {} name '{}'", what, raw),
        ));
    }
    Ok(raw)
}

/// Split a `name` or `name.part` reference
pub(crate) fn parse_reference<'a>(
    raw: &'a str,
    what: &str,
) -> QueryResult<(&'a str, Option<&'a str>)> {
    if raw.is_empty() {
        return Err(QueryError::syntax(raw, format!("missing {}", what)));
    }
    all_consuming(dotted)(raw)
        .map(|(_, parts)| parts)
        .map_err(|_| QueryError::syntax(raw, format!("invalid {} reference '{}'", what, raw)))
}

/// Require `name` to be a dimension, telling a wrong-kind name apart from an
/// unknown one
pub(crate) fn require_dimension<S: CubeSchema + ?Sized>(
    schema: &S,
    input: &str,
    name: &str,
) -> QueryResult<()> {
    if schema.has_dimension(name) {
        Ok(())
    } else if schema.has_measure(name) {
        Err(QueryError::new(
            input,
            QueryErrorKind::NotADimension(name.to_string()),
        ))
    } else {
        Err(QueryError::new(
            input,
            QueryErrorKind::UnknownDimension(name.to_string()),
        ))
    }
}

/// Require `name` to be a measure, telling a wrong-kind name apart from an
/// unknown one
pub(crate) fn require_measure<S: CubeSchema + ?Sized>(
    schema: &S,
    input: &str,
    name: &str,
) -> QueryResult<()> {
    if schema.has_measure(name) {
        Ok(())
    } else if schema.has_dimension(name) {
        Err(QueryError::new(
            input,
            QueryErrorKind::NotAMeasure(name.to_string()),
        ))
    } else {
        Err(QueryError::new(
            input,
            QueryErrorKind::UnknownMeasure(name.to_string()),
        ))
    }
}

/// Level check, only enforced with `strict_levels`
pub(crate) fn check_level<S: CubeSchema + ?Sized>(
    schema: &S,
    options: &ParserOptions,
    input: &str,
    dimension: &str,
    level: Option<&str>,
) -> QueryResult<()> {
    match level {
        Some(level) if options.strict_levels && !schema.has_hierarchy_level(dimension, level) => {
            Err(QueryError::new(
                input,
                QueryErrorKind::UnknownLevel {
                    dimension: dimension.to_string(),
                    level: level.to_string(),
                },
            ))
        }
        _ => Ok(()),
    }
}
