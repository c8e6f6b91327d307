//! Pagination parameters
//!
//! Resolves the `page` and `pagesize` request parameters into an offset and
//! limit. Page sizes above the configured maximum are clamped.

use serde::{Deserialize, Serialize};

use crate::query::ast::Value;
use crate::query::error::{QueryError, QueryErrorKind, QueryResult};
use crate::query::parser::ParserOptions;
use crate::query::value::coerce;

/// A resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number
    pub page: u64,
    /// Rows per page
    pub page_size: u64,
}

impl Pagination {
    /// Resolve raw `page` / `pagesize` parameters
    pub fn resolve(
        page: Option<&str>,
        page_size: Option<&str>,
        options: &ParserOptions,
    ) -> QueryResult<Self> {
        let page = positive("page", page)?.unwrap_or(1);
        let requested = positive("pagesize", page_size)?.unwrap_or(options.default_page_size);
        let page_size = requested.min(options.max_page_size);
        if page_size < requested {
            tracing::debug!(requested, page_size, "Clamped page size");
        }
        Ok(Self { page, page_size })
    }

    /// Rows to skip
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Rows to return
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

fn positive(name: &str, raw: Option<&str>) -> QueryResult<Option<u64>> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(None),
    };

    match coerce(raw.trim()) {
        Value::Integer(n) if n >= 1 => Ok(Some(n as u64)),
        _ => Err(QueryError::new(
            raw,
            QueryErrorKind::InvalidPagination(format!(
                "{} must be a positive integer, got '{}'",
                name, raw
            )),
        )),
    }
}
