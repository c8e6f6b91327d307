//! Fields (columns of a member or fact listing)
//!
//! ```text
//! fields_expr := ref (',' ref)*
//! ref         := dimension ('.' level)? | measure
//! ```

use crate::model::CubeSchema;
use crate::query::ast::Field;
use crate::query::error::{QueryError, QueryErrorKind, QueryResult};
use crate::query::parser::{check_level, parse_reference, ExpressionParser, ParserOptions};
use crate::query::tokenizer::split;

/// Parser for field lists
pub struct Fields<'s, S: ?Sized> {
    schema: &'s S,
    options: ParserOptions,
}

impl<'s, S: CubeSchema + ?Sized> Fields<'s, S> {
    /// Bind a parser to a schema
    pub fn new(schema: &'s S) -> Self {
        Self::with_options(schema, ParserOptions::default())
    }

    /// Bind a parser to a schema with explicit options
    pub fn with_options(schema: &'s S, options: ParserOptions) -> Self {
        Self { schema, options }
    }

    fn parse_ref(&self, raw: &str) -> QueryResult<Field> {
        if raw.is_empty() {
            return Err(QueryError::syntax(raw, "empty field"));
        }

        match parse_reference(raw, "field")? {
            (dimension, level) if self.schema.has_dimension(dimension) => {
                check_level(self.schema, &self.options, raw, dimension, level)?;
                Ok(Field::Dimension {
                    dimension: dimension.to_string(),
                    level: level.map(str::to_string),
                })
            }
            (measure, None) if self.schema.has_measure(measure) => Ok(Field::Measure {
                measure: measure.to_string(),
            }),
            _ => Err(QueryError::new(
                raw,
                QueryErrorKind::UnknownField(raw.to_string()),
            )),
        }
    }
}

impl<S: CubeSchema + ?Sized> ExpressionParser for Fields<'_, S> {
    type Output = Field;

    const GRAMMAR: &'static str = "fields";

    fn options(&self) -> &ParserOptions {
        &self.options
    }

    fn parse_expression(&self, text: &str) -> QueryResult<Vec<Field>> {
        split(text, ',')?
            .into_iter()
            .map(|segment| self.parse_ref(segment.raw()))
            .collect()
    }
}
