//! In-memory cube model
//!
//! A small, serde-loadable description of a cube's dimensions, measures and
//! aggregate functions, implementing [`CubeSchema`].
//!
//! ```json
//! {
//!   "name": "spending",
//!   "dimensions": { "cofog1": { "levels": ["name", "label"] } },
//!   "measures": { "amount": { "aggregates": ["sum", "avg"], "default_aggregate": "sum" } },
//!   "aggregate_functions": ["sum", "avg", "min", "max"]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::model::error::{ModelError, ModelResult};
use crate::model::schema::CubeSchema;
use crate::query::{is_identifier, COUNT_AGGREGATE};

/// A dimension of the cube
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDef {
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Hierarchy levels, coarsest first
    #[serde(default)]
    pub levels: Vec<String>,
}

/// A measure of the cube
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureDef {
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Functions allowed for this measure; empty means the cube-wide list
    #[serde(default)]
    pub aggregates: Vec<String>,
    /// Function used when none is requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_aggregate: Option<String>,
}

/// Cube description loaded from JSON or TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(default)]
    dimensions: BTreeMap<String, DimensionDef>,

    #[serde(default)]
    measures: BTreeMap<String, MeasureDef>,

    #[serde(default = "default_aggregate_functions")]
    aggregate_functions: Vec<String>,
}

fn default_aggregate_functions() -> Vec<String> {
    ["sum", "avg", "min", "max"]
        .iter()
        .map(|f| f.to_string())
        .collect()
}

impl Default for CubeModel {
    fn default() -> Self {
        Self {
            name: None,
            dimensions: BTreeMap::new(),
            measures: BTreeMap::new(),
            aggregate_functions: default_aggregate_functions(),
        }
    }
}

impl CubeModel {
    /// Start building a model in code
    pub fn builder() -> CubeModelBuilder {
        CubeModelBuilder::default()
    }

    /// Parse and validate a JSON model
    pub fn from_json_str(s: &str) -> ModelResult<Self> {
        let model: CubeModel = serde_json::from_str(s)?;
        model.validate()?;
        Ok(model)
    }

    /// Parse and validate a TOML model
    pub fn from_toml_str(s: &str) -> ModelResult<Self> {
        let model: CubeModel = toml::from_str(s)?;
        model.validate()?;
        Ok(model)
    }

    /// Load a model file; `.toml` files are read as TOML, anything else as JSON
    pub fn load(path: &Path) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let model = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            _ => Self::from_json_str(&content)?,
        };

        tracing::info!(
            path = ?path,
            dimensions = model.dimensions.len(),
            measures = model.measures.len(),
            "Loaded cube model"
        );
        Ok(model)
    }

    /// Model name, if given
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Dimension names in sorted order
    pub fn dimension_names(&self) -> impl Iterator<Item = &str> {
        self.dimensions.keys().map(String::as_str)
    }

    /// Measure names in sorted order
    pub fn measure_names(&self) -> impl Iterator<Item = &str> {
        self.measures.keys().map(String::as_str)
    }

    /// Look up a dimension
    pub fn dimension(&self, name: &str) -> Option<&DimensionDef> {
        self.dimensions.get(name)
    }

    /// Look up a measure
    pub fn measure(&self, name: &str) -> Option<&MeasureDef> {
        self.measures.get(name)
    }

    /// Cube-wide aggregate functions
    pub fn aggregate_functions(&self) -> &[String] {
        &self.aggregate_functions
    }

    fn allowed_aggregates<'a>(&'a self, measure: &'a MeasureDef) -> &'a [String] {
        if measure.aggregates.is_empty() {
            &self.aggregate_functions
        } else {
            &measure.aggregates
        }
    }

    /// Check the model for names the expression grammar cannot reference and
    /// for contradicting definitions
    pub fn validate(&self) -> ModelResult<()> {
        for (name, dimension) in &self.dimensions {
            check_name("dimension", name)?;
            if self.measures.contains_key(name) {
                return Err(ModelError::Invalid(format!(
                    "'{}' is both a dimension and a measure",
                    name
                )));
            }
            for level in &dimension.levels {
                check_name("level", level)?;
            }
        }

        for function in &self.aggregate_functions {
            check_name("aggregate function", function)?;
        }

        for (name, measure) in &self.measures {
            check_name("measure", name)?;
            for function in &measure.aggregates {
                check_name("aggregate function", function)?;
            }
            if let Some(default) = &measure.default_aggregate {
                if !self.allowed_aggregates(measure).contains(default) {
                    return Err(ModelError::Invalid(format!(
                        "default aggregate '{}' of measure '{}' is not one of its functions",
                        default, name
                    )));
                }
            }
        }

        Ok(())
    }
}

fn check_name(kind: &str, name: &str) -> ModelResult<()> {
    if !is_identifier(name) {
        return Err(ModelError::Invalid(format!(
            "{} name '{}' must be letters, digits or '_'",
            kind, name
        )));
    }
    if name == COUNT_AGGREGATE {
        return Err(ModelError::Invalid(format!(
            "{} name '{}' is reserved",
            kind, name
        )));
    }
    Ok(())
}

impl CubeSchema for CubeModel {
    fn has_dimension(&self, name: &str) -> bool {
        self.dimensions.contains_key(name)
    }

    fn has_measure(&self, name: &str) -> bool {
        self.measures.contains_key(name)
    }

    fn has_aggregate_function(&self, function: &str) -> bool {
        self.aggregate_functions.iter().any(|f| f == function)
            || self
                .measures
                .values()
                .any(|m| m.aggregates.iter().any(|f| f == function))
    }

    fn measure_has_aggregate(&self, measure: &str, function: &str) -> bool {
        self.measures
            .get(measure)
            .map(|m| self.allowed_aggregates(m).iter().any(|f| f == function))
            .unwrap_or(false)
    }

    fn default_aggregate_for(&self, measure: &str) -> Option<&str> {
        let def = self.measures.get(measure)?;
        def.default_aggregate
            .as_deref()
            .or_else(|| self.allowed_aggregates(def).first().map(String::as_str))
    }

    fn has_hierarchy_level(&self, dimension: &str, level: &str) -> bool {
        self.dimensions
            .get(dimension)
            .map(|d| d.levels.iter().any(|l| l == level))
            .unwrap_or(false)
    }
}

/// Builder for [`CubeModel`]
#[derive(Debug, Clone, Default)]
pub struct CubeModelBuilder {
    model: CubeModel,
}

impl CubeModelBuilder {
    /// Set the model name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.model.name = Some(name.into());
        self
    }

    /// Add a dimension without levels
    pub fn dimension(self, name: impl Into<String>) -> Self {
        self.dimension_with_levels(name, &[])
    }

    /// Add a dimension with hierarchy levels
    pub fn dimension_with_levels(mut self, name: impl Into<String>, levels: &[&str]) -> Self {
        self.model.dimensions.insert(
            name.into(),
            DimensionDef {
                label: None,
                levels: levels.iter().map(|l| l.to_string()).collect(),
            },
        );
        self
    }

    /// Add a measure that accepts the cube-wide functions
    pub fn measure(self, name: impl Into<String>) -> Self {
        self.measure_with_aggregates(name, &[])
    }

    /// Add a measure restricted to the given functions
    pub fn measure_with_aggregates(mut self, name: impl Into<String>, aggregates: &[&str]) -> Self {
        self.model.measures.insert(
            name.into(),
            MeasureDef {
                label: None,
                aggregates: aggregates.iter().map(|a| a.to_string()).collect(),
                default_aggregate: None,
            },
        );
        self
    }

    /// Replace the cube-wide function list
    pub fn aggregate_functions(mut self, functions: &[&str]) -> Self {
        self.model.aggregate_functions = functions.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Validate and finish the model
    pub fn build(self) -> ModelResult<CubeModel> {
        self.model.validate()?;
        Ok(self.model)
    }
}
