//! # cube-expr
//!
//! Query-expression layer for OLAP-style aggregation: turns compact, user-typed
//! request parameters (cuts, drilldowns, aggregates, ordering) into typed
//! records validated against a cube schema, before any data is touched.
//!
//! ## Modules
//!
//! - [`model`]: the read-only cube schema capability and an in-memory model
//! - [`query`]: tokenizer, value coercion and the expression parsers
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use cube_expr::model::CubeModel;
//! use cube_expr::query::{Aggregates, Drilldowns, ExpressionParser, Ordering};
//!
//! let cube = CubeModel::from_json_str(r#"{
//!     "dimensions": { "cofog1": { "levels": ["name", "label"] } },
//!     "measures": { "amount": {} }
//! }"#).unwrap();
//!
//! let drilldowns = Drilldowns::new(&cube).parse(Some("cofog1.name")).unwrap();
//! let aggregates = Aggregates::new(&cube).parse(Some("amount.sum|_count")).unwrap();
//! let ordering = Ordering::new(&cube).parse(Some("amount.sum:desc")).unwrap();
//!
//! assert_eq!(drilldowns[0].level.as_deref(), Some("name"));
//! assert!(aggregates[1].is_count());
//! assert_eq!(ordering[0].direction.as_str(), "desc");
//!
//! // Measures are not dimensions
//! assert!(Drilldowns::new(&cube).parse(Some("amount")).is_err());
//! ```

pub mod config;
pub mod model;
pub mod query;

// Re-export top-level types for convenience
pub use model::{CubeModel, CubeSchema, ModelError};

pub use query::{
    Aggregate, Aggregates, Cut, Cuts, Direction, Drilldown, Drilldowns, ExpressionParser, Field,
    Fields, OrderKey, Ordering, ParsedQuery, ParserOptions, QueryError, QueryErrorKind,
    QueryRequest, QueryResult, Value,
};

pub use config::{Config, ConfigError, LoggingConfig, ModelConfig, ParserConfig};
