use crate::ApiResult;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to one element of a loaded model.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Property sets attached to an element: set name -> property name -> value.
pub type PropertySets = IndexMap<String, IndexMap<String, Value>>;

/// Read-only view of a typed object graph.
///
/// Every operation is fallible on its own so that a single malformed element
/// can be skipped without abandoning a whole scan.
pub trait Model: Send + Sync {
    /// All elements, in a stable order.
    fn iterate_elements(&self) -> ApiResult<Vec<ElementId>>;

    fn type_name(&self, element: ElementId) -> ApiResult<String>;

    /// Elements whose type is `type_name` or one of its subtypes.
    fn elements_of_type(&self, type_name: &str) -> ApiResult<Vec<ElementId>>;

    /// Direct parent of `type_name` in the schema, `None` at the root.
    fn supertype(&self, type_name: &str) -> ApiResult<Option<String>>;

    /// Names of the attributes that can be read from `element`.
    fn attribute_names(&self, element: ElementId) -> ApiResult<Vec<String>>;

    fn get_attribute(&self, element: ElementId, name: &str) -> ApiResult<Option<Value>>;

    fn property_sets(&self, element: ElementId) -> ApiResult<PropertySets>;
}
