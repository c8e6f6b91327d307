//! Drilldowns (groupings)
//!
//! ```text
//! dd_expr := dimref ('|' dimref)*
//! dimref  := dimension ('.' level)?
//! ```

use crate::model::CubeSchema;
use crate::query::ast::Drilldown;
use crate::query::error::{QueryError, QueryResult};
use crate::query::parser::{
    check_level, parse_reference, require_dimension, ExpressionParser, ParserOptions,
};
use crate::query::tokenizer::split;

/// Parser for drilldown expressions
pub struct Drilldowns<'s, S: ?Sized> {
    schema: &'s S,
    options: ParserOptions,
}

impl<'s, S: CubeSchema + ?Sized> Drilldowns<'s, S> {
    /// Bind a parser to a schema
    pub fn new(schema: &'s S) -> Self {
        Self::with_options(schema, ParserOptions::default())
    }

    /// Bind a parser to a schema with explicit options
    pub fn with_options(schema: &'s S, options: ParserOptions) -> Self {
        Self { schema, options }
    }

    fn parse_dimref(&self, raw: &str) -> QueryResult<Drilldown> {
        if raw.is_empty() {
            return Err(QueryError::syntax(raw, "empty drilldown"));
        }
        let (dimension, level) = parse_reference(raw, "dimension")?;
        require_dimension(self.schema, raw, dimension)?;
        check_level(self.schema, &self.options, raw, dimension, level)?;

        Ok(Drilldown {
            dimension: dimension.to_string(),
            level: level.map(str::to_string),
        })
    }
}

impl<S: CubeSchema + ?Sized> ExpressionParser for Drilldowns<'_, S> {
    type Output = Drilldown;

    const GRAMMAR: &'static str = "drilldowns";

    fn options(&self) -> &ParserOptions {
        &self.options
    }

    fn parse_expression(&self, text: &str) -> QueryResult<Vec<Drilldown>> {
        split(text, '|')?
            .into_iter()
            .map(|segment| self.parse_dimref(segment.raw()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::simple_model;
    use crate::query::error::QueryErrorKind;

    fn parse(text: &str) -> QueryResult<Vec<Drilldown>> {
        let model = simple_model();
        Drilldowns::new(&model).parse(Some(text))
    }

    #[test]
    fn test_drilldowns() {
        let dd = parse("foo|bar").unwrap();
        assert_eq!(dd, vec![Drilldown::new("foo"), Drilldown::new("bar")]);
    }

    #[test]
    fn test_drilldowns_with_level() {
        let dd = parse("cofog1.name|time.year").unwrap();
        assert_eq!(
            dd,
            vec![
                Drilldown::at_level("cofog1", "name"),
                Drilldown::at_level("time", "year"),
            ]
        );
    }

    #[test]
    fn test_drilldowns_level_not_checked_by_default() {
        let dd = parse("cofog1.code").unwrap();
        assert_eq!(dd[0].level.as_deref(), Some("code"));
    }

    #[test]
    fn test_drilldowns_strict_levels() {
        let model = simple_model();
        let options = ParserOptions {
            strict_levels: true,
            ..ParserOptions::default()
        };
        let parser = Drilldowns::with_options(&model, options);
        assert!(parser.parse(Some("cofog1.name")).is_ok());
        let err = parser.parse(Some("foo|cofog1.code")).unwrap_err();
        assert_eq!(
            err.kind(),
            &QueryErrorKind::UnknownLevel {
                dimension: "cofog1".into(),
                level: "code".into(),
            }
        );
        assert_eq!(err.input(), "foo|cofog1.code");
    }

    #[test]
    fn test_drilldowns_invalid() {
        let err = parse("amount").unwrap_err();
        assert_eq!(err.kind(), &QueryErrorKind::NotADimension("amount".into()));
    }

    #[test]
    fn test_drilldowns_unknown() {
        let err = parse("foo|nope").unwrap_err();
        assert_eq!(err.kind(), &QueryErrorKind::UnknownDimension("nope".into()));
    }

    #[test]
    fn test_drilldowns_syntax() {
        for text in ["foo||bar", "foo|", "f oo", "foo.", "foo.a.b", "\"foo\""] {
            assert!(parse(text).unwrap_err().is_syntax(), "{}", text);
        }
    }

    #[test]
    fn test_drilldowns_duplicates_and_empty() {
        assert_eq!(parse("foo|foo").unwrap().len(), 2);
        let model = simple_model();
        assert!(Drilldowns::new(&model).parse(None).unwrap().is_empty());
    }
}
