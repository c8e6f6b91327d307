//! Ordering (sort keys)
//!
//! ```text
//! order_expr := field (',' field)*
//! field      := name (':' direction)?
//! direction  := 'asc' | 'desc'
//! ```
//!
//! A name is a dimension (optionally with a level), a `measure.function`
//! aggregate or `_count`. Each field without a direction sorts ascending.

use crate::model::CubeSchema;
use crate::query::ast::{Direction, OrderKey, COUNT_AGGREGATE};
use crate::query::error::{QueryError, QueryErrorKind, QueryResult};
use crate::query::parser::{check_level, parse_reference, ExpressionParser, ParserOptions};
use crate::query::tokenizer::{split, split_once};

/// Parser for ordering expressions
pub struct Ordering<'s, S: ?Sized> {
    schema: &'s S,
    options: ParserOptions,
}

impl<'s, S: CubeSchema + ?Sized> Ordering<'s, S> {
    /// Bind a parser to a schema
    pub fn new(schema: &'s S) -> Self {
        Self::with_options(schema, ParserOptions::default())
    }

    /// Bind a parser to a schema with explicit options
    pub fn with_options(schema: &'s S, options: ParserOptions) -> Self {
        Self { schema, options }
    }

    fn parse_field(&self, raw: &str) -> QueryResult<OrderKey> {
        if raw.is_empty() {
            return Err(QueryError::syntax(raw, "empty sort field"));
        }

        let (name, direction) = split_once(raw, ':')?;
        let name = name.raw();
        self.check_orderable(raw, name)?;

        let direction = match direction {
            None => Direction::Asc,
            Some(token) => Direction::from_token(token).ok_or_else(|| {
                QueryError::syntax(
                    raw,
                    format!("invalid sort direction '{}', expected 'asc' or 'desc'", token),
                )
            })?,
        };

        Ok(OrderKey::new(name, direction))
    }

    fn check_orderable(&self, raw: &str, name: &str) -> QueryResult<()> {
        if name == COUNT_AGGREGATE {
            return Ok(());
        }

        let (base, suffix) = parse_reference(name, "sort field")?;
        if self.schema.has_dimension(base) {
            return check_level(self.schema, &self.options, raw, base, suffix);
        }
        if self.schema.has_measure(base) {
            return match suffix {
                Some(function) if self.schema.measure_has_aggregate(base, function) => Ok(()),
                Some(_) => Err(QueryError::new(
                    raw,
                    QueryErrorKind::UnknownAggregate(name.to_string()),
                )),
                None => Err(QueryError::new(
                    raw,
                    QueryErrorKind::MissingFunction(base.to_string()),
                )),
            };
        }

        Err(QueryError::new(
            raw,
            QueryErrorKind::UnknownField(name.to_string()),
        ))
    }
}

impl<S: CubeSchema + ?Sized> ExpressionParser for Ordering<'_, S> {
    type Output = OrderKey;

    const GRAMMAR: &'static str = "ordering";

    fn options(&self) -> &ParserOptions {
        &self.options
    }

    fn parse_expression(&self, text: &str) -> QueryResult<Vec<OrderKey>> {
        split(text, ',')?
            .into_iter()
            .map(|segment| self.parse_field(segment.raw()))
            .collect()
    }
}
