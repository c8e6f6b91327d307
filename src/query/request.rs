//! Request bundling
//!
//! Collects the raw expression parameters of one aggregation request and
//! parses them together against a schema.
//!
//! ```text
//! ?cut=foo:bar|bar:5&drilldown=cofog1.name&aggregates=amount.sum|_count&order=amount.sum:desc&page=2
//! ```

use serde::{Deserialize, Serialize};

use crate::model::CubeSchema;
use crate::query::aggregates::Aggregates;
use crate::query::ast::{Aggregate, Cut, Drilldown, Field, OrderKey};
use crate::query::cuts::Cuts;
use crate::query::drilldowns::Drilldowns;
use crate::query::error::{QueryError, QueryResult};
use crate::query::fields::Fields;
use crate::query::ordering::Ordering;
use crate::query::pagination::Pagination;
use crate::query::parser::{ExpressionParser, ParserOptions};

/// Raw query parameters, as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryRequest {
    /// Cut expression
    pub cut: Option<String>,
    /// Drilldown expression
    pub drilldown: Option<String>,
    /// Aggregates expression
    pub aggregates: Option<String>,
    /// Ordering expression
    pub order: Option<String>,
    /// Field list
    pub fields: Option<String>,
    /// Page number
    pub page: Option<String>,
    /// Page size
    pub pagesize: Option<String>,
}

/// Every expression of a request, parsed and validated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// Filters
    pub cuts: Vec<Cut>,
    /// Groupings
    pub drilldowns: Vec<Drilldown>,
    /// Summaries
    pub aggregates: Vec<Aggregate>,
    /// Sort keys
    pub ordering: Vec<OrderKey>,
    /// Listed columns
    pub fields: Vec<Field>,
    /// Page window
    pub pagination: Pagination,
}

impl QueryRequest {
    /// Decode a URL query string such as `cut=foo%3Abar&page=2`.
    ///
    /// `+` decodes to a space, unknown keys are ignored and the last
    /// occurrence of a repeated key wins.
    pub fn from_query_string(query: &str) -> QueryResult<Self> {
        let mut request = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode(value)?;
            let slot = match decode(key)?.as_str() {
                "cut" => &mut request.cut,
                "drilldown" => &mut request.drilldown,
                "aggregates" => &mut request.aggregates,
                "order" => &mut request.order,
                "fields" => &mut request.fields,
                "page" => &mut request.page,
                "pagesize" => &mut request.pagesize,
                other => {
                    tracing::debug!(key = other, "Ignoring unknown query parameter");
                    continue;
                }
            };
            *slot = Some(value);
        }

        Ok(request)
    }

    /// Parse every expression. Fails on the first rejected parameter, checked
    /// in the order cut, drilldown, aggregates, order, fields, pagination.
    pub fn parse<S: CubeSchema + ?Sized>(
        &self,
        schema: &S,
        options: &ParserOptions,
    ) -> QueryResult<ParsedQuery> {
        let cuts = Cuts::with_options(schema, options.clone()).parse(self.cut.as_deref())?;
        let drilldowns =
            Drilldowns::with_options(schema, options.clone()).parse(self.drilldown.as_deref())?;
        let aggregates =
            Aggregates::with_options(schema, options.clone()).parse(self.aggregates.as_deref())?;
        let ordering = Ordering::with_options(schema, options.clone()).parse(self.order.as_deref())?;
        let fields = Fields::with_options(schema, options.clone()).parse(self.fields.as_deref())?;
        let pagination =
            Pagination::resolve(self.page.as_deref(), self.pagesize.as_deref(), options)?;

        Ok(ParsedQuery {
            cuts,
            drilldowns,
            aggregates,
            ordering,
            fields,
            pagination,
        })
    }
}

fn decode(raw: &str) -> QueryResult<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| QueryError::syntax(raw, format!("invalid URL encoding: {}", e)))
}
