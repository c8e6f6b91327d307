//! Read-only cube schema capability
//!
//! The expression parsers never look inside a cube model. Everything they
//! need to know about names is asked through [`CubeSchema`].

use std::rc::Rc;
use std::sync::Arc;

/// Name lookups the expression parsers validate against.
///
/// Implementations are expected to answer from memory; the parsers call these
/// methods once or twice per referenced name and never mutate the schema.
pub trait CubeSchema {
    /// Is `name` a dimension of the cube
    fn has_dimension(&self, name: &str) -> bool;

    /// Is `name` a measure of the cube
    fn has_measure(&self, name: &str) -> bool;

    /// Is `function` an aggregate function of the cube
    fn has_aggregate_function(&self, function: &str) -> bool;

    /// Can `measure` be aggregated with `function`.
    ///
    /// Defaults to the global function check, for schemas without
    /// per-measure function lists.
    fn measure_has_aggregate(&self, measure: &str, function: &str) -> bool {
        self.has_measure(measure) && self.has_aggregate_function(function)
    }

    /// The function used when a measure is aggregated without an explicit one
    fn default_aggregate_for(&self, measure: &str) -> Option<&str>;

    /// Does `dimension` have the hierarchy level `level`
    fn has_hierarchy_level(&self, dimension: &str, level: &str) -> bool;
}

macro_rules! forward_schema {
    ($($ptr:ty),*) => {$(
        impl<T: CubeSchema + ?Sized> CubeSchema for $ptr {
            fn has_dimension(&self, name: &str) -> bool {
                (**self).has_dimension(name)
            }

            fn has_measure(&self, name: &str) -> bool {
                (**self).has_measure(name)
            }

            fn has_aggregate_function(&self, function: &str) -> bool {
                (**self).has_aggregate_function(function)
            }

            fn measure_has_aggregate(&self, measure: &str, function: &str) -> bool {
                (**self).measure_has_aggregate(measure, function)
            }

            fn default_aggregate_for(&self, measure: &str) -> Option<&str> {
                (**self).default_aggregate_for(measure)
            }

            fn has_hierarchy_level(&self, dimension: &str, level: &str) -> bool {
                (**self).has_hierarchy_level(dimension, level)
            }
        }
    )*};
}

forward_schema!(&T, Box<T>, Rc<T>, Arc<T>);
