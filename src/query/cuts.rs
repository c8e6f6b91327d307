//! Cuts (filters)
//!
//! ```text
//! cut_expr := clause ('|' clause)*
//! clause   := dimension ':' valueset
//! valueset := value (';' value)*
//! ```
//!
//! Unquoted values are typed by [`coerce`]; quoted values are always strings.

use crate::model::CubeSchema;
use crate::query::ast::{Cut, CutOperator, Value};
use crate::query::error::{QueryError, QueryResult};
use crate::query::parser::{parse_identifier, require_dimension, ExpressionParser, ParserOptions};
use crate::query::tokenizer::{split, split_once, QUOTE};
use crate::query::value::coerce;

/// Parser for cut expressions
pub struct Cuts<'s, S: ?Sized> {
    schema: &'s S,
    options: ParserOptions,
}

impl<'s, S: CubeSchema + ?Sized> Cuts<'s, S> {
    /// Bind a parser to a schema
    pub fn new(schema: &'s S) -> Self {
        Self::with_options(schema, ParserOptions::default())
    }

    /// Bind a parser to a schema with explicit options
    pub fn with_options(schema: &'s S, options: ParserOptions) -> Self {
        Self { schema, options }
    }

    fn parse_clause(&self, clause: &str) -> QueryResult<Cut> {
        if clause.is_empty() {
            return Err(QueryError::syntax(clause, "empty cut"));
        }

        let (head, rest) = split_once(clause, ':')?;
        let dimension = parse_identifier(head.raw(), "dimension")?;
        let values = rest.ok_or_else(|| {
            QueryError::syntax(clause, format!("expected ':' after dimension '{}'", dimension))
        })?;
        require_dimension(self.schema, clause, dimension)?;

        // The separator is the only operator so far
        let operator = CutOperator::In;

        let values = split(values, ';')?
            .into_iter()
            .map(|segment| {
                if segment.is_quoted() {
                    Ok(Value::String(segment.text().to_string()))
                } else if segment.raw().starts_with(QUOTE) {
                    Err(QueryError::syntax(
                        clause,
                        format!("unexpected text after quoted value '{}'", segment.raw()),
                    ))
                } else if segment.is_empty() {
                    Err(QueryError::syntax(
                        clause,
                        format!("empty value in cut on '{}'", dimension),
                    ))
                } else {
                    Ok(coerce(segment.raw()))
                }
            })
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(Cut {
            dimension: dimension.to_string(),
            operator,
            values,
        })
    }
}

impl<S: CubeSchema + ?Sized> ExpressionParser for Cuts<'_, S> {
    type Output = Cut;

    const GRAMMAR: &'static str = "cuts";

    fn options(&self) -> &ParserOptions {
        &self.options
    }

    fn parse_expression(&self, text: &str) -> QueryResult<Vec<Cut>> {
        split(text, '|')?
            .into_iter()
            .map(|segment| self.parse_clause(segment.raw()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::simple_model;
    use crate::query::error::QueryErrorKind;
    use chrono::NaiveDate;

    fn parse(text: &str) -> QueryResult<Vec<Cut>> {
        let model = simple_model();
        Cuts::new(&model).parse(Some(text))
    }

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_cuts_null_and_empty() {
        let model = simple_model();
        let cuts = Cuts::new(&model);
        assert!(cuts.parse(None).unwrap().is_empty());
        assert!(cuts.parse(Some("")).unwrap().is_empty());
        assert!(cuts.parse(Some("   ")).unwrap().is_empty());
    }

    #[test]
    fn test_cuts_unquoted_string() {
        let cuts = parse("foo:bar").unwrap();
        assert_eq!(cuts, vec![Cut::new("foo", vec![Value::from("bar")])]);
        assert_eq!(cuts[0].operator.as_str(), ":");
    }

    #[test]
    fn test_cuts_quoted_string() {
        let cuts = parse(r#"foo:"bar lala""#).unwrap();
        assert_eq!(cuts, vec![Cut::new("foo", vec![Value::from("bar lala")])]);
    }

    #[test]
    fn test_cuts_string_set() {
        let cuts = parse(r#"foo:"bar";"lala""#).unwrap();
        assert_eq!(
            cuts,
            vec![Cut::new("foo", vec![Value::from("bar"), Value::from("lala")])]
        );
    }

    #[test]
    fn test_cuts_int_set() {
        let cuts = parse("foo:3;22").unwrap();
        assert_eq!(
            cuts,
            vec![Cut::new("foo", vec![Value::Integer(3), Value::Integer(22)])]
        );
    }

    #[test]
    fn test_cuts_multiple() {
        let cuts = parse("foo:bar|bar:5").unwrap();
        assert_eq!(
            cuts,
            vec![
                Cut::new("foo", vec![Value::from("bar")]),
                Cut::new("bar", vec![Value::Integer(5)]),
            ]
        );
    }

    #[test]
    fn test_cuts_multiple_int_first() {
        let cuts = parse("bar:5|foo:bar").unwrap();
        assert_eq!(cuts.len(), 2);
        assert_eq!(cuts[0], Cut::new("bar", vec![Value::Integer(5)]));
    }

    #[test]
    fn test_cuts_quotes() {
        let cuts = parse(r#"foo:"bar|lala"|bar:5"#).unwrap();
        assert_eq!(cuts.len(), 2);
        assert_eq!(cuts[0].values, vec![Value::from("bar|lala")]);
    }

    #[test]
    fn test_cuts_date() {
        let cuts = parse("foo:2015-01-04").unwrap();
        assert_eq!(cuts[0].values, vec![date(2015, 1, 4)]);
    }

    #[test]
    fn test_cuts_date_set() {
        let cuts = parse("foo:2015-01-04;2015-01-05").unwrap();
        assert_eq!(cuts.len(), 1);
        assert_eq!(cuts[0].values, vec![date(2015, 1, 4), date(2015, 1, 5)]);
    }

    #[test]
    fn test_cuts_int() {
        let cuts = parse("foo:2015").unwrap();
        assert_eq!(cuts[0].values, vec![Value::Integer(2015)]);
    }

    #[test]
    fn test_cuts_int_prefixed_string() {
        let cuts = parse("foo:2015M01").unwrap();
        assert_eq!(cuts[0].values, vec![Value::from("2015M01")]);
    }

    #[test]
    fn test_cuts_quoted_number_stays_string() {
        let cuts = parse(r#"foo:"2015";2015"#).unwrap();
        assert_eq!(
            cuts[0].values,
            vec![Value::from("2015"), Value::Integer(2015)]
        );
    }

    #[test]
    fn test_cuts_invalid_dimension_name() {
        let err = parse("f oo:2015-01-04").unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(err.input(), "f oo:2015-01-04");
    }

    #[test]
    fn test_cuts_unknown_dimension() {
        let err = parse("nope:1").unwrap_err();
        assert_eq!(err.kind(), &QueryErrorKind::UnknownDimension("nope".into()));
    }

    #[test]
    fn test_cuts_on_measure() {
        let err = parse("amount:1").unwrap_err();
        assert_eq!(err.kind(), &QueryErrorKind::NotADimension("amount".into()));
    }

    #[test]
    fn test_cuts_syntax_errors() {
        for text in [
            "foo",
            "foo:",
            "foo:a;;b",
            "foo:a;",
            "foo:bar||bar:5",
            "foo:bar|",
            ":bar",
            r#"foo:"bar"#,
            r#""foo":bar"#,
            r#"foo:"bar"x"#,
            r#"foo:"a":b"#,
            r#"foo:x;"a",b"#,
        ] {
            let err = parse(text).unwrap_err();
            assert!(err.is_syntax(), "{} -> {:?}", text, err);
            assert_eq!(err.input(), text);
        }
    }

    #[test]
    fn test_cuts_rendered_quoted_values_parse_back() {
        let cuts = parse(r#"foo:"a:b";"2015";x"#).unwrap();
        assert_eq!(
            cuts[0].values,
            vec![Value::from("a:b"), Value::from("2015"), Value::from("x")]
        );
        assert_eq!(parse(&cuts[0].to_string()).unwrap(), cuts);
    }

    #[test]
    fn test_cuts_empty_quoted_value() {
        let cuts = parse(r#"foo:"""#).unwrap();
        assert_eq!(cuts[0].values, vec![Value::from("")]);
    }

    #[test]
    fn test_cuts_duplicates_preserved() {
        let cuts = parse("foo:1|foo:1").unwrap();
        assert_eq!(cuts.len(), 2);
        assert_eq!(cuts[0], cuts[1]);
    }

    #[test]
    fn test_cuts_idempotent() {
        let model = simple_model();
        let parser = Cuts::new(&model);
        let text = r#"foo:"a;b";7|time:2015-01-04"#;
        assert_eq!(parser.parse(Some(text)).unwrap(), parser.parse(Some(text)).unwrap());
    }

    #[test]
    fn test_cuts_display_round_trip() {
        let text = r#"foo:"bar lala";3;"7"|bar:2015-01-04;x"#;
        let cuts = parse(text).unwrap();
        let rendered: Vec<String> = cuts.iter().map(|c| c.to_string()).collect();
        assert_eq!(rendered.join("|"), text);
    }

    #[test]
    fn test_cuts_max_length() {
        let model = simple_model();
        let options = ParserOptions {
            max_expression_length: Some(8),
            ..ParserOptions::default()
        };
        let cuts = Cuts::with_options(&model, options);
        assert!(cuts.parse(Some("foo:bar")).is_ok());
        assert!(cuts.parse(Some("foo:barbaz")).unwrap_err().is_syntax());
    }
}
