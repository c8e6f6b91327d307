//! Query expression layer
//!
//! Turns the compact textual parameters of an aggregation request into typed,
//! schema-validated records:
//!
//! - **Tokenizer**: quote-aware splitting shared by every grammar
//! - **Value**: integer / date / string typing of unquoted cut values
//! - **Cuts, Drilldowns, Aggregates, Ordering, Fields**: one parser per grammar
//! - **Request**: parse all parameters of a request at once
//!
//! # Grammars
//!
//! ```text
//! cut         foo:bar|bar:5;6|time:"2015-01-04"
//! drilldown   cofog1.name|bar
//! aggregates  amount.sum|_count
//! order       amount.sum:desc,foo
//! fields      foo,cofog1.label,amount
//! ```
//!
//! # Example
//!
//! ```rust
//! use cube_expr::model::CubeModel;
//! use cube_expr::query::{Cuts, ExpressionParser, Value};
//!
//! let cube = CubeModel::builder().dimension("year").build().unwrap();
//! let cuts = Cuts::new(&cube).parse(Some("year:2015;2016")).unwrap();
//! assert_eq!(cuts[0].values, vec![Value::Integer(2015), Value::Integer(2016)]);
//! ```

mod aggregates;
mod ast;
mod cuts;
mod drilldowns;
mod error;
mod fields;
mod ordering;
mod pagination;
mod parser;
mod request;
mod tokenizer;
mod value;

pub use aggregates::Aggregates;
pub use ast::{
    Aggregate, Cut, CutOperator, Direction, Drilldown, Field, OrderKey, Value, COUNT_AGGREGATE,
};
pub use cuts::Cuts;
pub use drilldowns::Drilldowns;
pub use error::{QueryError, QueryErrorKind, QueryResult};
pub use fields::Fields;
pub use ordering::Ordering;
pub use pagination::Pagination;
pub use parser::{is_identifier, ExpressionParser, ParserOptions};
pub use request::{ParsedQuery, QueryRequest};
pub use tokenizer::{split, split_once, Segment, DELIMITERS, QUOTE};
pub use value::{coerce, parse_date, parse_integer};
