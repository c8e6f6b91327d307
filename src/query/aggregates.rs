//! Aggregates (measures with functions)
//!
//! ```text
//! agg_expr := aggref ('|' aggref)*
//! aggref   := measure '.' function | '_count'
//! ```
//!
//! `_count` counts rows and needs no measure or schema lookup.

use crate::model::CubeSchema;
use crate::query::ast::{Aggregate, COUNT_AGGREGATE};
use crate::query::error::{QueryError, QueryErrorKind, QueryResult};
use crate::query::parser::{parse_reference, require_measure, ExpressionParser, ParserOptions};
use crate::query::tokenizer::split;

/// Parser for aggregate expressions
pub struct Aggregates<'s, S: ?Sized> {
    schema: &'s S,
    options: ParserOptions,
}

impl<'s, S: CubeSchema + ?Sized> Aggregates<'s, S> {
    /// Bind a parser to a schema
    pub fn new(schema: &'s S) -> Self {
        Self::with_options(schema, ParserOptions::default())
    }

    /// Bind a parser to a schema with explicit options
    pub fn with_options(schema: &'s S, options: ParserOptions) -> Self {
        Self { schema, options }
    }

    fn parse_aggref(&self, raw: &str) -> QueryResult<Aggregate> {
        if raw.is_empty() {
            return Err(QueryError::syntax(raw, "empty aggregate"));
        }
        if raw == COUNT_AGGREGATE {
            return Ok(Aggregate::count());
        }

        let (measure, function) = parse_reference(raw, "aggregate")?;
        require_measure(self.schema, raw, measure)?;
        let function = function.ok_or_else(|| {
            QueryError::new(raw, QueryErrorKind::MissingFunction(measure.to_string()))
        })?;

        if !self.schema.measure_has_aggregate(measure, function) {
            return Err(QueryError::new(
                raw,
                QueryErrorKind::UnknownAggregate(raw.to_string()),
            ));
        }

        Ok(Aggregate::new(measure, function))
    }
}

impl<S: CubeSchema + ?Sized> ExpressionParser for Aggregates<'_, S> {
    type Output = Aggregate;

    const GRAMMAR: &'static str = "aggregates";

    fn options(&self) -> &ParserOptions {
        &self.options
    }

    fn parse_expression(&self, text: &str) -> QueryResult<Vec<Aggregate>> {
        split(text, '|')?
            .into_iter()
            .map(|segment| self.parse_aggref(segment.raw()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::simple_model;

    fn parse(text: &str) -> QueryResult<Vec<Aggregate>> {
        let model = simple_model();
        Aggregates::new(&model).parse(Some(text))
    }

    #[test]
    fn test_aggregates() {
        let agg = parse("amount.sum").unwrap();
        assert_eq!(agg, vec![Aggregate::new("amount", "sum")]);

        let agg = parse("amount.sum|_count").unwrap();
        assert_eq!(agg.len(), 2);
        assert!(agg[1].is_count());
        assert_eq!(agg[1].measure, None);
    }

    #[test]
    fn test_aggregates_count_only() {
        assert_eq!(parse("_count").unwrap(), vec![Aggregate::count()]);
    }

    #[test]
    fn test_aggregates_invalid() {
        let err = parse("amount").unwrap_err();
        assert_eq!(err.kind(), &QueryErrorKind::MissingFunction("amount".into()));
    }

    #[test]
    fn test_aggregates_dimension() {
        let err = parse("cofog1.name").unwrap_err();
        assert_eq!(err.kind(), &QueryErrorKind::NotAMeasure("cofog1".into()));
        let err = parse("foo").unwrap_err();
        assert_eq!(err.kind(), &QueryErrorKind::NotAMeasure("foo".into()));
    }

    #[test]
    fn test_aggregates_unknown_measure() {
        let err = parse("amount.sum|volume.sum").unwrap_err();
        assert_eq!(err.kind(), &QueryErrorKind::UnknownMeasure("volume".into()));
        assert_eq!(err.input(), "amount.sum|volume.sum");
    }

    #[test]
    fn test_aggregates_unknown_function() {
        let err = parse("amount.median").unwrap_err();
        assert_eq!(
            err.kind(),
            &QueryErrorKind::UnknownAggregate("amount.median".into())
        );
    }

    #[test]
    fn test_aggregates_syntax() {
        for text in ["amount.sum||_count", "|_count", "amount.", "amount.sum.x", "\"amount.sum\""] {
            let err = parse(text).unwrap_err();
            assert!(err.is_syntax(), "{} -> {:?}", text, err);
        }
    }

    #[test]
    fn test_count_takes_no_function() {
        let err = parse("_count.sum").unwrap_err();
        assert_eq!(err.kind(), &QueryErrorKind::UnknownMeasure("_count".into()));
    }

    #[test]
    fn test_aggregates_order_and_duplicates() {
        let agg = parse("_count|amount.avg|amount.avg").unwrap();
        assert_eq!(
            agg,
            vec![
                Aggregate::count(),
                Aggregate::new("amount", "avg"),
                Aggregate::new("amount", "avg"),
            ]
        );
    }
}
