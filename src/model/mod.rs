//! Cube schema
//!
//! - **Schema**: the read-only [`CubeSchema`] capability the expression parsers use
//! - **Cube**: [`CubeModel`], an in-memory schema loaded from JSON or TOML

mod cube;
mod error;
mod schema;

pub use cube::{CubeModel, CubeModelBuilder, DimensionDef, MeasureDef};
pub use error::{ModelError, ModelResult};
pub use schema::CubeSchema;

/// The model every parser test runs against
#[cfg(test)]
pub(crate) fn simple_model() -> CubeModel {
    CubeModel::from_json_str(include_str!("fixtures/simple_model.json"))
        .expect("fixture model is valid")
}
